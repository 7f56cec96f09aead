//! Shared constants used across the application

use std::time::Duration;

/// API root used when the config does not override it.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Total completion attempts per ask, counting the original send.
pub const MAX_ATTEMPTS: u32 = 5;

/// Pause between a retry's reselection and the resend, so a provider that
/// just rate-limited us is not hit again immediately.
pub const RETRY_PAUSE: Duration = Duration::from_millis(500);

/// File name of the persisted conversation slot inside the data directory.
pub const CONVERSATION_FILE: &str = "conversation.json";
