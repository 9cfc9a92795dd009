//! Logging macros gated on a per-module `ENABLE_LOGS` switch.
//!
//! A module opts in by declaring the switch once:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! ```
//! and then calls `crate::log_info!(...)` and friends. Output still goes through
//! the `log` facade, so `RUST_LOG` filtering applies on top of the switch.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Errors ignore the switch; a failure is always worth reporting.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}
