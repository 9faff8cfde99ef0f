use std::net::SocketAddr;
use std::time::Duration;

/// Gateway configuration, read from environment with defaults
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// HS256 secret for session token verification
    pub jwt_secret: String,
    /// TTL for highest-bid and bid-history caches
    pub cache_ttl: Duration,
    /// Deadline for settlement executor calls
    pub settlement_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_parsed("GATEWAY_BIND", SocketAddr::from(([0, 0, 0, 0], 8080))),
            jwt_secret: std::env::var("GATEWAY_JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret".to_string()),
            cache_ttl: Duration::from_secs(env_parsed("GATEWAY_CACHE_TTL_SECS", 300u64)),
            settlement_timeout: Duration::from_secs(env_parsed(
                "GATEWAY_SETTLEMENT_TIMEOUT_SECS",
                45u64,
            )),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
