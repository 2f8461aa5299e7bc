use std::sync::atomic::{AtomicUsize, Ordering};

struct Config {
    worker_threads: AtomicUsize,
}

/// `0` means "one thread per rank, capped by the available parallelism".
static CONFIG: Config = Config {
    worker_threads: AtomicUsize::new(0),
};

pub struct ConfigSnapshot {
    pub worker_threads: usize,
}

impl ConfigSnapshot {
    /// Number of runtime worker threads to use for a run with `ranks` ranks.
    pub fn threads_for(&self, ranks: usize) -> usize {
        let cap = match self.worker_threads {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        };
        ranks.min(cap).max(1)
    }
}

pub fn get_config() -> ConfigSnapshot {
    ConfigSnapshot {
        worker_threads: CONFIG.worker_threads.load(Ordering::Relaxed),
    }
}

pub fn set_worker_threads(threads: usize) {
    CONFIG.worker_threads.store(threads, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn explicit_cap_limits_threads() {
        set_worker_threads(2);
        let config = get_config();
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.threads_for(9), 2);
        assert_eq!(config.threads_for(1), 1);
        set_worker_threads(0);
    }

    #[test]
    #[serial]
    fn default_never_exceeds_ranks() {
        set_worker_threads(0);
        let config = get_config();
        assert_eq!(config.threads_for(1), 1);
        assert!(config.threads_for(64) >= 1);
        assert!(config.threads_for(3) <= 3);
    }
}
