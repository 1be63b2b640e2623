use std::collections::HashMap;
use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use osmium::api::errors::KernelError;
use osmium::api::kernel::Kernel;
use osmium::backing::errors::BackingError;
use osmium::config::KernelConfig;
use osmium::debugger::{DebugLevel, set_debug_level};
use osmium::sched::scheduler::{Interpreter, Policy};

const VAR_STORE_SIZE: usize = 10;
const MAX_ARGS_SIZE: usize = 7;
const MAX_EXEC_PROGRAMS: usize = 3;

fn bad_command() -> i32 {
    println!("Unknown Command");
    1
}

fn bad_command_file_does_not_exist() -> i32 {
    println!("Bad command: File not found");
    3
}

fn bad_command_too_many_tokens() -> i32 {
    println!("Bad command: Too many tokens");
    4
}

fn bad_command_too_few_tokens() -> i32 {
    println!("Bad command: Too few tokens");
    5
}

fn bad_command_invalid_policy() -> i32 {
    println!("Bad command: Invalid policy");
    6
}

fn bad_command_duplicate_programs() -> i32 {
    println!("Bad command: Duplicate programs in exec");
    7
}

/// Line-oriented command dispatcher. Algorithmically thin: every scheduled
/// instruction comes back through `execute_line` and lands in `dispatch`.
#[derive(Clone)]
struct Shell {
    kernel: Kernel,
    vars: Arc<Mutex<HashMap<String, String>>>,
}

impl Interpreter for Shell {
    fn execute_line(&mut self, line: &str) -> i32 {
        self.dispatch(line)
    }
}

impl Shell {
    fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            vars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn dispatch(&mut self, line: &str) -> i32 {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return 0;
        }
        if tokens.len() > MAX_ARGS_SIZE {
            return bad_command_too_many_tokens();
        }

        match tokens[0] {
            "help" => {
                if tokens.len() != 1 {
                    return bad_command();
                }
                self.help()
            }

            "quit" => {
                if tokens.len() != 1 {
                    return bad_command();
                }
                self.kernel.request_shutdown();
                0
            }

            "set" => {
                if tokens.len() < 3 {
                    return bad_command();
                }
                self.set(tokens[1], &tokens[2..])
            }

            "print" => {
                if tokens.len() != 2 {
                    return bad_command();
                }
                self.print(tokens[1])
            }

            "echo" => {
                if tokens.len() != 2 {
                    return bad_command();
                }
                self.echo(tokens[1])
            }

            "run" => {
                if tokens.len() != 2 {
                    return bad_command();
                }
                self.run_script(tokens[1])
            }

            "exec" => self.exec(&tokens[1..]),

            _ => bad_command(),
        }
    }

    fn help(&self) -> i32 {
        println!(
            "COMMAND\t\t\t\tDESCRIPTION\n\
             help\t\t\t\tDisplays all the commands\n\
             quit\t\t\t\tExits the shell\n\
             set VAR STRING\t\t\tAssigns a value to shell memory\n\
             print VAR\t\t\tDisplays the STRING assigned to VAR\n\
             echo TOKEN\t\t\tDisplays TOKEN ($VAR expands it)\n\
             run SCRIPT\t\t\tExecutes the file SCRIPT\n\
             exec P1 [P2 P3] POLICY [#] [MT]\tSchedules programs under POLICY"
        );
        0
    }

    fn set(&mut self, var: &str, values: &[&str]) -> i32 {
        let mut vars = self.vars.lock().unwrap();
        if !vars.contains_key(var) && vars.len() >= VAR_STORE_SIZE {
            println!("Variable store is full");
            return 1;
        }
        vars.insert(var.to_string(), values.join(" "));
        0
    }

    fn print(&self, var: &str) -> i32 {
        match self.vars.lock().unwrap().get(var) {
            Some(value) => println!("{}", value),
            None => println!("Variable does not exist"),
        }
        0
    }

    fn echo(&self, token: &str) -> i32 {
        if let Some(var) = token.strip_prefix('$') {
            match self.vars.lock().unwrap().get(var) {
                Some(value) => println!("{}", value),
                None => println!(),
            }
        } else {
            println!("{}", token);
        }
        0
    }

    /// `run SCRIPT`: admit, enqueue, drive FCFS to completion.
    fn run_script(&mut self, path: &str) -> i32 {
        let pid = match self.kernel.admit_from_file(path) {
            Ok(pid) => pid,
            Err(e) => return report_admission_error(e),
        };
        if self.kernel.enqueue(pid).is_err() {
            return bad_command();
        }

        let mut interp = self.clone();
        match self.kernel.run("FCFS", &mut interp) {
            Ok(status) => status,
            Err(e) => {
                eprintln!("{}", e);
                1
            }
        }
    }

    /// `exec P1 [P2 P3] POLICY [#] [MT]`.
    ///
    /// `#` admits the remainder of the current batch script ahead of the
    /// named programs; `MT` drives the run with two worker threads.
    fn exec(&mut self, args: &[&str]) -> i32 {
        let mut args = args.to_vec();
        let mut background = false;
        let mut multithreaded = false;

        while let Some(&flag) = args.last() {
            match flag {
                "#" => {
                    background = true;
                    args.pop();
                }
                "MT" => {
                    multithreaded = true;
                    args.pop();
                }
                _ => break,
            }
        }

        let policy_name = match args.pop() {
            Some(name) => name,
            None => return bad_command_too_few_tokens(),
        };
        if policy_name.parse::<Policy>().is_err() {
            return bad_command_invalid_policy();
        }
        if args.is_empty() && !background {
            return bad_command_too_few_tokens();
        }
        if args.len() > MAX_EXEC_PROGRAMS {
            return bad_command_too_many_tokens();
        }
        for (index, program) in args.iter().enumerate() {
            if args[index + 1..].contains(program) {
                return bad_command_duplicate_programs();
            }
        }

        let mut pids = Vec::new();
        for program in &args {
            match self.kernel.admit_from_file(program) {
                Ok(pid) => pids.push(pid),
                Err(e) => return report_admission_error(e),
            }
        }
        for pid in &pids {
            if self.kernel.enqueue(*pid).is_err() {
                return bad_command();
            }
        }

        if background {
            match self.kernel.admit_from_stdin() {
                Ok(pid) => {
                    if self.kernel.enqueue_priority(pid).is_err() {
                        return bad_command();
                    }
                }
                Err(e) => return report_admission_error(e),
            }
        }

        let outcome = if multithreaded {
            let interps: Vec<Box<dyn Interpreter + Send>> =
                vec![Box::new(self.clone()), Box::new(self.clone())];
            self.kernel.run_workers(policy_name, interps)
        } else {
            let mut interp = self.clone();
            self.kernel.run(policy_name, &mut interp)
        };

        match outcome {
            Ok(status) => status,
            Err(e) => {
                eprintln!("{}", e);
                1
            }
        }
    }
}

fn report_admission_error(e: KernelError) -> i32 {
    match e {
        KernelError::Backing(BackingError::SourceUnavailable { .. }) => {
            bad_command_file_does_not_exist()
        }
        other => {
            println!("{}", other);
            1
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let debug_level = args
        .iter()
        .find(|arg| arg.starts_with("--debug="))
        .and_then(|arg| arg.strip_prefix("--debug="))
        .and_then(|level| level.parse::<u8>().ok())
        .map(DebugLevel::from_u8)
        .unwrap_or(DebugLevel::Off);

    set_debug_level(debug_level);

    let config = KernelConfig::default();
    println!(
        "Frame Store Size = {}; Variable Store Size = {}",
        config.frame_store_size, VAR_STORE_SIZE
    );

    let mut shell = Shell::new(Kernel::new(config));

    if io::stdin().is_terminal() {
        let mut editor = DefaultEditor::new()?;
        loop {
            if shell.kernel.shutdown_requested() {
                break;
            }
            match editor.readline("$ ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    shell.dispatch(&line);
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
                Err(e) => return Err(e.into()),
            }
        }
    } else {
        let stdin = io::stdin();
        let mut buffer = String::new();
        loop {
            if shell.kernel.shutdown_requested() {
                break;
            }
            buffer.clear();
            if stdin.read_line(&mut buffer)? == 0 {
                break;
            }
            shell.dispatch(buffer.trim_end_matches(['\n', '\r']));
        }
    }

    if shell.kernel.shutdown_requested() {
        println!("Bye!");
    }
    Ok(())
}
