use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_TICK_RATE: u32 = 20;

// End of round: the result is repeated this many times before the reset.
pub const END_BROADCAST_REPEATS: u32 = 10;
pub const END_BROADCAST_SPACING: Duration = Duration::from_secs(1);

/// Runtime settings for [`crate::network::Server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Longest the loop waits for a datagram before broadcasting anyway
    pub tick_duration: Duration,
    pub end_repeats: u32,
    pub end_spacing: Duration,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr, tick_rate: u32) -> Self {
        Self {
            bind_addr,
            tick_duration: Duration::from_micros(1_000_000 / u64::from(tick_rate.max(1))),
            end_repeats: END_BROADCAST_REPEATS,
            end_spacing: END_BROADCAST_SPACING,
        }
    }
}
