//! Error types used by subscriptions and data sources.
//!
//! This module defines the error taxonomy of the crate:
//!
//! - [`ConfigError`]: the subscription could not be assembled (reported by `start`).
//! - [`LifecycleError`]: an operation was invoked in the wrong lifecycle state.
//! - [`SourceError`]: a runtime failure, delivered asynchronously as an event.
//! - [`SubmitError`]: an execution context refused a job.
//! - [`PvError`]: umbrella for the two synchronous kinds.
//!
//! Configuration and lifecycle errors are returned at the call site. Source
//! errors never cross a thread boundary as `Err`: they travel to the listener
//! chain as [`Event::Error`](crate::Event::Error) or
//! [`Event::WriteFailed`](crate::Event::WriteFailed).
//!
//! Every type provides `as_label` / `as_message` helpers for logs and metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while validating a subscription configuration.
///
/// Returned by [`PvConfig::start`](crate::PvConfig::start); the subscription never begins.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither the configuration nor the client defaults provide a data source.
    #[error("no data source: set one on the configuration or as a client default")]
    MissingSource,

    /// Neither the configuration nor the client defaults provide an execution context.
    #[error("no execution context: set one on the configuration or as a client default")]
    MissingExecutor,

    /// No listener was registered.
    #[error("no listener registered")]
    MissingListener,

    /// No tokio runtime was configured and none is active on the calling thread.
    #[error("no tokio runtime available to drive the scheduler")]
    MissingRuntime,

    /// The maximum notification rate must be a positive interval.
    #[error("invalid max rate {rate:?}: must be greater than zero")]
    InvalidMaxRate {
        /// The rejected interval.
        rate: Duration,
    },

    /// The connection timeout must be a positive duration.
    #[error("invalid connection timeout {timeout:?}: must be greater than zero")]
    InvalidTimeout {
        /// The rejected timeout.
        timeout: Duration,
    },

    /// The mode requires a read side but the expression has none.
    #[error("expression has no read side")]
    MissingReadExpression,

    /// The mode requires a write side but the expression has none.
    #[error("expression has no write side")]
    MissingWriteExpression,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pvflow::ConfigError;
    ///
    /// assert_eq!(ConfigError::MissingListener.as_label(), "config_missing_listener");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::MissingSource => "config_missing_source",
            ConfigError::MissingExecutor => "config_missing_executor",
            ConfigError::MissingListener => "config_missing_listener",
            ConfigError::MissingRuntime => "config_missing_runtime",
            ConfigError::InvalidMaxRate { .. } => "config_invalid_max_rate",
            ConfigError::InvalidTimeout { .. } => "config_invalid_timeout",
            ConfigError::MissingReadExpression => "config_missing_read_expression",
            ConfigError::MissingWriteExpression => "config_missing_write_expression",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by operations invoked in the wrong lifecycle state.
///
/// Post-close operations never silently reactivate anything.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The component was closed; `op` names the rejected operation.
    #[error("{op} after close")]
    Closed {
        /// Name of the rejected operation.
        op: &'static str,
    },

    /// `start` was called more than once.
    #[error("already started")]
    AlreadyStarted,

    /// The operation requires a started component.
    #[error("not started")]
    NotStarted,

    /// The subscription has no write side.
    #[error("subscription is read-only")]
    NotWritable,
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pvflow::LifecycleError;
    ///
    /// let err = LifecycleError::Closed { op: "resume" };
    /// assert_eq!(err.as_label(), "lifecycle_closed");
    /// assert_eq!(err.to_string(), "resume after close");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::Closed { .. } => "lifecycle_closed",
            LifecycleError::AlreadyStarted => "lifecycle_already_started",
            LifecycleError::NotStarted => "lifecycle_not_started",
            LifecycleError::NotWritable => "lifecycle_not_writable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Runtime failures reported by data sources and timers.
///
/// These are carried by events; they never close the subscription and never
/// alter the last known value or connection state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No connection was observed within the configured window.
    #[error("{message} (no connection after {timeout:?})")]
    ConnectionTimeout {
        /// The configured timeout.
        timeout: Duration,
        /// User-facing message attached to the timeout.
        message: String,
    },

    /// The source reported a failure.
    #[error("source failure: {reason}")]
    Failed {
        /// Source-provided description.
        reason: String,
    },

    /// The source refused or could not complete a write.
    #[error("write rejected: {reason}")]
    WriteRejected {
        /// Source-provided description.
        reason: String,
    },

    /// The channel is not connected.
    #[error("channel disconnected")]
    Disconnected,
}

impl SourceError {
    /// Shorthand for [`SourceError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        SourceError::Failed {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`SourceError::WriteRejected`].
    pub fn write_rejected(reason: impl Into<String>) -> Self {
        SourceError::WriteRejected {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pvflow::SourceError;
    ///
    /// assert_eq!(SourceError::failed("boom").as_label(), "source_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SourceError::ConnectionTimeout { .. } => "source_connection_timeout",
            SourceError::Failed { .. } => "source_failed",
            SourceError::WriteRejected { .. } => "source_write_rejected",
            SourceError::Disconnected => "source_disconnected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SourceError::ConnectionTimeout { timeout, message } => {
                format!("timeout: {message} after {timeout:?}")
            }
            SourceError::Failed { reason } => format!("error: {reason}"),
            SourceError::WriteRejected { reason } => format!("write: {reason}"),
            SourceError::Disconnected => "disconnected".to_string(),
        }
    }

    /// Indicates whether this is the synthesized connection timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::ConnectionTimeout { .. })
    }
}

/// # Rejection of a job by an execution context.
///
/// The rejected job has already been dropped when this is returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The queue is at capacity; a later submission may succeed.
    #[error("execution queue full")]
    Full,

    /// The execution context no longer accepts work.
    #[error("execution context closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::Full => "submit_full",
            SubmitError::Closed => "submit_closed",
        }
    }
}

/// # Synchronous failure at a call site.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PvError {
    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operation not allowed in the current state.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl PvError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PvError::Config(e) => e.as_label(),
            PvError::Lifecycle(e) => e.as_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_carries_user_text() {
        let err = SourceError::ConnectionTimeout {
            timeout: Duration::from_millis(50),
            message: "Connection timeout".into(),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Connection timeout (no connection after 50ms)");
        assert!(!SourceError::Disconnected.is_timeout());
    }

    #[test]
    fn umbrella_keeps_inner_label() {
        let err: PvError = ConfigError::InvalidMaxRate {
            rate: Duration::ZERO,
        }
        .into();
        assert_eq!(err.as_label(), "config_invalid_max_rate");

        let err: PvError = LifecycleError::AlreadyStarted.into();
        assert_eq!(err.as_label(), "lifecycle_already_started");
        assert_eq!(err.to_string(), "already started");
    }
}
