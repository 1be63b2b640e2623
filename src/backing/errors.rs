use std::fmt;

#[derive(Debug)]
pub enum BackingError {
    SourceUnavailable { name: String },

    InteractiveModeUnsupported,

    Io { message: String },
}

impl fmt::Display for BackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackingError::SourceUnavailable { name } => {
                write!(f, "backing store error: cannot open source '{}'", name)
            }

            BackingError::InteractiveModeUnsupported => {
                write!(
                    f,
                    "backing store error: cannot load a script from an interactive terminal"
                )
            }

            BackingError::Io { message } => {
                write!(f, "backing store IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for BackingError {}

pub type BackingResult<T> = Result<T, BackingError>;
