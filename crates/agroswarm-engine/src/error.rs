//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the episode run.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: agroswarm_core::config::ConfigError,
    },

    /// The episode runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: agroswarm_core::runner::RunnerError,
    },

    /// The log filter in the config could not be parsed.
    #[error("invalid log level {level:?}: {message}")]
    LogFilter {
        /// The configured level string.
        level: String,
        /// Parser message.
        message: String,
    },
}
