//! Run-wide politeness gate between fetch starts.
//!
//! `acquire` sleeps a random delay while holding one async mutex, so the
//! sleeps of different workers never overlap: the whole pool issues roughly
//! one fetch per drawn delay, and any two fetch starts are at least `min`
//! apart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

#[derive(Debug)]
pub struct RateLimiter {
    min: Duration,
    max: Duration,
    gate: Mutex<StdRng>,
}

impl RateLimiter {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self::with_rng(min, max, StdRng::from_entropy())
    }

    pub fn with_seed(min: Duration, max: Duration, seed: u64) -> Self {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    /// Build from config seconds; `seed` makes the delay sequence reproducible.
    pub fn from_config(cfg: &RateLimitConfig, seed: Option<u64>) -> Self {
        let min = Duration::from_secs_f64(cfg.min_delay_secs.max(0.0));
        let max = Duration::from_secs_f64(cfg.max_delay_secs.max(0.0));
        match seed {
            Some(seed) => Self::with_seed(min, max, seed),
            None => Self::new(min, max),
        }
    }

    fn with_rng(min: Duration, max: Duration, rng: StdRng) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            gate: Mutex::new(rng),
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min
    }

    /// Waits for the gate, then sleeps a delay drawn uniformly from `[min, max]`
    /// before releasing it. Returns the delay slept.
    pub async fn acquire(&self) -> Duration {
        let mut rng = self.gate.lock().await;
        let delay = if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        };
        tokio::time::sleep(delay).await;
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::Instant;

    async fn start_times(limiter: Arc<RateLimiter>, tasks: usize) -> Vec<Duration> {
        let origin = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..tasks {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                origin.elapsed()
            }));
        }
        let mut starts = Vec::new();
        for h in handles {
            starts.push(h.await.unwrap());
        }
        starts.sort();
        starts
    }

    #[tokio::test(start_paused = true)]
    async fn acquisitions_do_not_overlap() {
        let limiter = Arc::new(RateLimiter::with_seed(
            Duration::from_secs(3),
            Duration::from_secs(8),
            11,
        ));
        let starts = start_times(limiter, 6).await;
        assert!(starts[0] >= Duration::from_secs(3));
        for w in starts.windows(2) {
            assert!(w[1] - w[0] >= Duration::from_secs(3), "starts too close: {:?}", w);
            assert!(w[1] - w[0] <= Duration::from_secs(8));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn window_bound_on_fetch_starts() {
        let min = Duration::from_millis(500);
        let limiter = Arc::new(RateLimiter::with_seed(min, Duration::from_millis(900), 5));
        let starts = start_times(limiter, 20).await;
        let window = Duration::from_secs(3);
        let bound = (window.as_secs_f64() / min.as_secs_f64()).floor() as usize + 1;
        for (i, &s) in starts.iter().enumerate() {
            let in_window = starts[i..].iter().take_while(|&&t| t - s <= window).count();
            assert!(in_window <= bound, "{} starts in window, bound {}", in_window, bound);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_when_bounds_equal() {
        let limiter = RateLimiter::new(Duration::from_secs(2), Duration::from_secs(2));
        assert_eq!(limiter.acquire().await, Duration::from_secs(2));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let limiter = RateLimiter::new(Duration::from_secs(8), Duration::from_secs(3));
        assert_eq!(limiter.min_delay(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_same_delays() {
        let a = RateLimiter::with_seed(Duration::from_secs(1), Duration::from_secs(5), 99);
        let b = RateLimiter::with_seed(Duration::from_secs(1), Duration::from_secs(5), 99);
        for _ in 0..4 {
            assert_eq!(a.acquire().await, b.acquire().await);
        }
    }
}
