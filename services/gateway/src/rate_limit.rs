use crate::error::AppError;
use dashmap::DashMap;
use std::time::Instant;
use types::ids::WalletAddress;

/// Token bucket tracking one wallet's budget for one action
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = f64::min(self.capacity as f64, self.tokens + elapsed * self.refill_rate);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-wallet, per-action rate limiting
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Consume one token from the wallet's budget for `action`
    pub fn check(
        &self,
        wallet: &WalletAddress,
        action: &str,
        capacity: u32,
        refill_rate: f64,
    ) -> Result<(), AppError> {
        let key = format!("{wallet}:{action}");
        let mut bucket = self
            .buckets
            .entry(key)
            .or_insert_with(|| Bucket::new(capacity, refill_rate));

        if bucket.allow() {
            Ok(())
        } else {
            Err(AppError::RateLimitExceeded(format!(
                "Rate limit for {action}"
            )))
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhaustion() {
        let limiter = RateLimiter::new();
        let wallet = WalletAddress::new("0xA");

        assert!(limiter.check(&wallet, "bid", 2, 0.0).is_ok());
        assert!(limiter.check(&wallet, "bid", 2, 0.0).is_ok());
        assert!(limiter.check(&wallet, "bid", 2, 0.0).is_err());
    }

    #[test]
    fn test_actions_have_independent_budgets() {
        let limiter = RateLimiter::new();
        let wallet = WalletAddress::new("0xA");

        assert!(limiter.check(&wallet, "bid", 1, 0.0).is_ok());
        assert!(limiter.check(&wallet, "bid", 1, 0.0).is_err());
        assert!(limiter.check(&wallet, "accept", 1, 0.0).is_ok());
    }

    #[test]
    fn test_wallets_have_independent_budgets() {
        let limiter = RateLimiter::new();

        assert!(limiter.check(&WalletAddress::new("0xA"), "bid", 1, 0.0).is_ok());
        assert!(limiter.check(&WalletAddress::new("0xB"), "bid", 1, 0.0).is_ok());
    }
}
