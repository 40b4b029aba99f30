use std::time::Duration;
use tokio::time::sleep;

/// Spaces out outgoing messages so the chat gateway doesn't throttle us.
/// The first send goes out immediately.
pub struct RateLimiter {
    delay: Duration,
    sent: usize,
}

impl RateLimiter {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            sent: 0,
        }
    }

    pub async fn wait(&mut self) {
        if self.should_wait() {
            sleep(self.delay).await;
        }
        self.sent += 1;
    }

    fn should_wait(&self) -> bool {
        self.sent > 0 && !self.delay.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_first_send_is_immediate() {
        let mut limiter = RateLimiter::new(5_000);
        let started = Instant::now();
        limiter.wait().await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.sent, 1);
    }

    #[tokio::test]
    async fn test_zero_delay_never_sleeps() {
        let mut limiter = RateLimiter::new(0);
        limiter.wait().await;
        assert!(!limiter.should_wait());
    }

    #[tokio::test]
    async fn test_spacing_applies_after_first_send() {
        let mut limiter = RateLimiter::new(20);
        limiter.wait().await;
        let started = Instant::now();
        limiter.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(limiter.sent, 2);
    }
}
