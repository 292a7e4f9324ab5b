//! Utilities: logging setup (level derived from -v / -q) and external
//! command execution.
//!
//! Key items:
//!   init_logging / derive_level
//!   process::{run_command, split_command_line}

pub mod process;

/// Logging helpers.
pub mod logging {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }

        pub fn as_tracing(&self) -> Level {
            match self {
                LogLevel::Error => Level::ERROR,
                LogLevel::Info => Level::INFO,
                LogLevel::Debug => Level::DEBUG,
                LogLevel::Trace => Level::TRACE,
            }
        }

        /// nf-test gets `--verbose --debug` from this level up.
        pub fn is_debug(&self) -> bool {
            *self >= LogLevel::Debug
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Install the global subscriber. Logs go to stderr so stdout stays
    /// clean for `--json`.
    pub fn init_logging(level: LogLevel) -> Result<()> {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level.as_tracing())
            .with_target(level >= LogLevel::Trace)
            .with_thread_ids(false)
            .with_thread_names(false)
            .without_time()
            .with_ansi(std::env::var_os("NO_COLOR").is_none())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::trace!(level = level.as_str(), "logging initialized");
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn level_from_flags() {
            assert_eq!(derive_level(0, false), LogLevel::Info);
            assert_eq!(derive_level(1, false), LogLevel::Debug);
            assert_eq!(derive_level(5, false), LogLevel::Trace);
            assert_eq!(derive_level(2, true), LogLevel::Error);
        }

        #[test]
        fn debug_threshold() {
            assert!(!LogLevel::Info.is_debug());
            assert!(LogLevel::Debug.is_debug());
            assert!(LogLevel::Trace.is_debug());
            assert_eq!(LogLevel::Debug.as_tracing(), Level::DEBUG);
        }
    }
}

pub use logging::{LogLevel, derive_level, init_logging};
