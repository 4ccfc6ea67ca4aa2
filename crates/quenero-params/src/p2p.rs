//! Peer-to-peer defaults shared by every network

use std::time::Duration;

use serde::Serialize;

/// Support flag for fluffy block relay
pub const P2P_SUPPORT_FLAG_FLUFFY_BLOCKS: u32 = 0x01;
/// Support flags advertised in the handshake
pub const P2P_SUPPORT_FLAGS: u32 = P2P_SUPPORT_FLAG_FLUFFY_BLOCKS;

/// Defaults the P2P layer reads during listener and connection setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct P2pDefaults {
    /// Peers kept in the white (verified) list
    pub white_peerlist_limit: usize,
    /// Peers kept in the gray (unverified) list
    pub gray_peerlist_limit: usize,
    /// Outgoing connections
    pub connections_out: usize,
    /// Incoming connections
    pub connections_in: usize,
    /// Interval between handshakes with a connected peer
    pub handshake_interval: Duration,
    /// Largest accepted packet (bytes)
    pub packet_max_size: usize,
    /// Peers shared in one handshake
    pub peers_in_handshake: usize,
    /// Connect timeout
    pub connection_timeout: Duration,
    /// SOCKS connect timeout
    pub socks_connect_timeout: Duration,
    /// Ping timeout
    pub ping_connection_timeout: Duration,
    /// Command invoke timeout
    pub invoke_timeout: Duration,
    /// Handshake invoke timeout
    pub handshake_invoke_timeout: Duration,
    /// Share of outgoing connections picked from the white list (percent)
    pub whitelist_connections_percent: u8,
    /// Anchor connections kept across restarts
    pub anchor_connections: usize,
    /// Connections used while searching for sync peers
    pub sync_search_connections: usize,
    /// Upload rate limit (kB/s)
    pub limit_rate_up_kbps: u64,
    /// Download rate limit (kB/s)
    pub limit_rate_down_kbps: u64,
    /// How long a failed address is remembered
    pub failed_addr_forget: Duration,
    /// How long an address stays blocked
    pub ip_block_time: Duration,
    /// Failures before an address is blocked
    pub ip_fails_before_block: u32,
    /// Idle connection kill interval
    pub idle_connection_kill_interval: Duration,
}

/// The P2P defaults
pub const P2P_DEFAULTS: P2pDefaults = P2pDefaults {
    white_peerlist_limit: 1000,
    gray_peerlist_limit: 5000,
    connections_out: 8,
    connections_in: 32,
    handshake_interval: Duration::from_secs(60),
    packet_max_size: 50_000_000,
    peers_in_handshake: 250,
    connection_timeout: Duration::from_millis(5000),
    socks_connect_timeout: Duration::from_secs(45),
    ping_connection_timeout: Duration::from_millis(2000),
    invoke_timeout: Duration::from_millis(60 * 2 * 1000),
    handshake_invoke_timeout: Duration::from_millis(5000),
    whitelist_connections_percent: 70,
    anchor_connections: 2,
    sync_search_connections: 2,
    limit_rate_up_kbps: 2048,
    limit_rate_down_kbps: 8192,
    failed_addr_forget: Duration::from_secs(60 * 60),
    ip_block_time: Duration::from_secs(60 * 60 * 24),
    ip_fails_before_block: 10,
    idle_connection_kill_interval: Duration::from_secs(5 * 60),
};

impl Default for P2pDefaults {
    fn default() -> Self {
        P2P_DEFAULTS
    }
}

impl P2pDefaults {
    /// Outgoing connections that should come from the white list
    pub fn white_connections_out(&self) -> usize {
        self.connections_out * usize::from(self.whitelist_connections_percent) / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peerlist_limits() {
        let defaults = P2pDefaults::default();
        assert_eq!(defaults.white_peerlist_limit, 1000);
        assert_eq!(defaults.gray_peerlist_limit, 5000);
        assert!(defaults.peers_in_handshake < defaults.white_peerlist_limit);
    }

    #[test]
    fn test_white_connections_out() {
        // 70% of 8, truncated
        assert_eq!(P2P_DEFAULTS.white_connections_out(), 5);
    }
}
