use std::time::Duration;

/// Tunable timing and framing parameters for one session.
///
/// Constructed programmatically (no on-disk config, per spec.md §6); the
/// defaults match the fixed constants the original implementation hardcoded
/// in `constants.h`, surfaced here as fields so a test harness can shrink
/// timeouts without touching protocol logic.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Default socket read/write timeout. `constants.h`: `SOCKET_TIMEOUT_MS`.
    pub socket_timeout: Duration,
    /// Timeout for the handshake phase specifically.
    /// `constants.h`: `KEY_EXCHANGE_TIMEOUT_MS`.
    pub handshake_timeout: Duration,
    /// How long the responder waits for the filename after `Established`,
    /// long enough that a human at the initiator can be prompted.
    pub filename_timeout: Duration,
    /// Pause between retry attempts of the final `TACK` acknowledgement.
    /// `constants.h`: `RETRY_DELAY_MS`.
    pub retry_delay: Duration,
    /// Number of attempts for the final `TACK` acknowledgement.
    pub tack_retries: u32,
    /// Sender-side fixed payload chunk size. `constants.h`: `TRANSFER_BUFFER_SIZE`.
    pub chunk_size: usize,
    /// Payload records between rekey cycles. `constants.h`: `KEY_ROTATION_BLOCKS`.
    pub rekey_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            socket_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(5),
            filename_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(1),
            tack_retries: 3,
            chunk_size: 4096,
            rekey_interval: 1024,
        }
    }
}
