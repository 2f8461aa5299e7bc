use std::time::Instant;

/// Wall-clock splits in milliseconds.
pub struct Stopwatch {
    last: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Milliseconds since the previous split (or the start); restarts the clock.
    pub fn split(&mut self) -> f64 {
        let now = Instant::now();
        let ms = now.duration_since(self.last).as_secs_f64() * 1e3;
        self.last = now;
        ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_restart() {
        let mut sw = Stopwatch::start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let first = sw.split();
        let second = sw.split();
        assert!(first >= 5.0);
        assert!(second < first);
    }
}
