#[cfg(test)]
mod tests {
    use std::env;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    use crate::config::KernelConfig;
    use crate::memory::errors::MemoryError;
    use crate::memory::frame::FramePool;
    use crate::memory::page_table::PageTableRegistry;
    use crate::memory::paging::MemoryManager;

    fn script(lines: &[&str]) -> PathBuf {
        let path = env::temp_dir().join(format!("osmium_memory_{}.script", rand::random::<u64>()));
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn tiny_config(frames: usize) -> KernelConfig {
        KernelConfig {
            max_processes: 4,
            frame_store_size: frames * 3,
            page_size: 3,
        }
    }

    // -------- frame pool --------

    #[test]
    fn allocation_fills_distinct_frames_then_fails() {
        let mut pool = FramePool::new(2, 3);

        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        assert_ne!(a, b);
        assert!(pool.is_occupied(a));
        assert!(pool.is_occupied(b));
        assert_eq!(pool.occupied_count(), 2);

        assert!(matches!(pool.allocate(), Err(MemoryError::OutOfMemory)));
        assert_eq!(pool.occupied_count(), pool.capacity());
    }

    #[test]
    fn victim_is_least_recently_accessed() {
        let mut pool = FramePool::new(3, 3);

        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        let c = pool.allocate().unwrap();

        // a would be LRU by load order; touching it shifts the victim to b
        pool.touch(a);
        assert_eq!(pool.victim(), Some(b));

        pool.touch(b);
        assert_eq!(pool.victim(), Some(c));
    }

    #[test]
    fn release_clears_occupancy_and_returns_contents() {
        let mut pool = FramePool::new(1, 2);
        let frame = pool.allocate().unwrap();
        pool.fill(frame, vec![Some("one".to_string()), None]);

        let lines = pool.release(frame);
        assert_eq!(lines, vec![Some("one".to_string()), None]);
        assert!(!pool.is_occupied(frame));
        assert_eq!(pool.occupied_count(), 0);
    }

    #[test]
    fn empty_pool_has_no_victim() {
        let pool = FramePool::new(2, 3);
        assert_eq!(pool.victim(), None);
    }

    // -------- page table registry --------

    #[test]
    fn same_backing_shares_one_table() {
        let mut registry = PageTableRegistry::new();
        let backing = script(&["echo 1"]);

        registry.create(0, &backing, false).unwrap();
        registry.create(1, &backing, false).unwrap();

        assert!(registry.shared(0, 1));
        assert_eq!(registry.table_count(), 1);

        registry.get_mut(0).unwrap().map(0, 4);
        assert_eq!(registry.get(1).unwrap().entry(0), Some(4));
    }

    #[test]
    fn duplicate_page_table_is_rejected() {
        let mut registry = PageTableRegistry::new();
        let backing = script(&["echo 1"]);

        registry.create(0, &backing, false).unwrap();
        assert!(matches!(
            registry.create(0, &backing, false),
            Err(MemoryError::DuplicatePageTable { pid: 0 })
        ));
    }

    #[test]
    fn table_survives_until_last_reference() {
        let mut registry = PageTableRegistry::new();
        let backing = script(&["echo 1"]);

        registry.create(0, &backing, false).unwrap();
        registry.create(1, &backing, false).unwrap();

        assert!(registry.destroy(0).is_none());
        assert_eq!(registry.table_count(), 1);
        assert!(registry.get(1).is_some());

        assert!(registry.destroy(1).is_some());
        assert_eq!(registry.table_count(), 0);
    }

    #[test]
    fn clearing_frame_mappings_touches_every_table() {
        let mut registry = PageTableRegistry::new();
        let first = script(&["a"]);
        let second = script(&["b"]);

        registry.create(0, &first, false).unwrap();
        registry.create(1, &second, false).unwrap();
        registry.get_mut(0).unwrap().map(0, 2);
        registry.get_mut(1).unwrap().map(1, 2);

        registry.clear_mappings_to(2);

        assert!(!registry.any_mapping_to(2));
        assert_eq!(registry.get(0).unwrap().entry(0), None);
        assert_eq!(registry.get(1).unwrap().entry(1), None);
    }

    #[test]
    fn lookup_past_table_range_is_unmapped() {
        let mut registry = PageTableRegistry::new();
        let backing = script(&["a"]);

        registry.create(0, &backing, false).unwrap();
        assert_eq!(registry.get(0).unwrap().entry(99), None);
    }

    // -------- fault handling --------

    #[test]
    fn fault_loads_page_and_serves_lines() {
        let mut mem = MemoryManager::new(&tiny_config(2));
        let backing = script(&["l1", "l2", "l3", "l4"]);
        mem.create_page_table(7, &backing, false).unwrap();

        assert_eq!(mem.lookup(7, 0), None);
        mem.ensure_page_loaded(7, 0).unwrap();

        assert_eq!(mem.get_line(7, 0).unwrap(), "l1");
        assert_eq!(mem.get_line(7, 2).unwrap(), "l3");

        // second page is short; its trailing slots stay empty
        mem.ensure_page_loaded(7, 3).unwrap();
        assert_eq!(mem.get_line(7, 3).unwrap(), "l4");
        assert_eq!(mem.get_line(7, 4).unwrap(), "");
    }

    #[test]
    fn exhausted_pool_evicts_lru_and_retries() {
        let mut mem = MemoryManager::new(&tiny_config(1));
        let backing = script(&["l1", "l2", "l3", "l4", "l5", "l6"]);
        mem.create_page_table(0, &backing, false).unwrap();

        mem.ensure_page_loaded(0, 0).unwrap();
        let first = mem.lookup(0, 0).unwrap();

        // only one frame: faulting the second page must evict the first
        mem.ensure_page_loaded(0, 3).unwrap();
        assert_eq!(mem.lookup(0, 0), None);
        assert_eq!(mem.lookup(0, 3), Some(first));
        assert_eq!(mem.get_line(0, 4).unwrap(), "l5");

        // the evicted page re-faults with identical content
        mem.ensure_page_loaded(0, 0).unwrap();
        assert_eq!(mem.get_line(0, 1).unwrap(), "l2");
    }

    #[test]
    fn eviction_leaves_no_dangling_entry() {
        let mut mem = MemoryManager::new(&tiny_config(2));
        let first = script(&["a1", "a2", "a3"]);
        let second = script(&["b1", "b2", "b3"]);
        mem.create_page_table(0, &first, false).unwrap();
        mem.create_page_table(1, &second, false).unwrap();

        mem.ensure_page_loaded(0, 0).unwrap();
        mem.ensure_page_loaded(1, 0).unwrap();

        let victim = mem.evict_one().unwrap();
        assert!(!mem.tables().any_mapping_to(victim));
        assert!(!mem.pool().is_occupied(victim));
        assert!(mem.pool().occupied_count() <= mem.pool().capacity());
    }

    #[test]
    fn get_line_on_unhandled_fault_is_a_logic_error() {
        let mut mem = MemoryManager::new(&tiny_config(2));
        let backing = script(&["l1"]);
        mem.create_page_table(3, &backing, false).unwrap();

        assert!(matches!(
            mem.get_line(3, 0),
            Err(MemoryError::UnresolvedPageFault { pid: 3, page: 0 })
        ));
    }

    #[test]
    fn teardown_releases_frames_only_on_last_reference() {
        let mut mem = MemoryManager::new(&tiny_config(2));
        let backing = script(&["l1", "l2"]);
        mem.create_page_table(0, &backing, false).unwrap();
        mem.create_page_table(1, &backing, false).unwrap();

        mem.ensure_page_loaded(0, 0).unwrap();
        assert_eq!(mem.pool().occupied_count(), 1);

        mem.destroy_page_table(0);
        assert_eq!(mem.pool().occupied_count(), 1);
        assert_eq!(mem.lookup(1, 0), Some(0));

        mem.destroy_page_table(1);
        assert_eq!(mem.pool().occupied_count(), 0);
    }
}
