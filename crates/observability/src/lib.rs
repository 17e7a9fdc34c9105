//! Process-wide logging setup used by the console binary.

/// Initialize logging on stderr in the format named by
/// `STOCKPANEL_LOG_FORMAT` (JSON by default).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, formats).
pub mod tracing;

pub use tracing::LogFormat;
