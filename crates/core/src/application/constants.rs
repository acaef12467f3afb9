// Claim constants (no magic values)
use std::time::Duration;

/// Minimum time between two grants for the same identity (60s)
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Client tokens longer than this are ignored and replaced with a fresh one
pub const MAX_CLIENT_TOKEN_LEN: usize = 128;

/// Origin signals longer than this are ignored (treated as absent)
pub const MAX_ORIGIN_SIGNAL_LEN: usize = 256;

/// Default claim retention (7 days)
pub const DEFAULT_CLAIM_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default interval between maintenance runs (1 hour)
pub const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60 * 60);
