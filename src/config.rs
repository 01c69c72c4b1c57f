//! # Subscription configuration.
//!
//! [`PvConfig`] is a plain value assembled once with consuming `with_*`
//! setters and validated exactly once, by the pure function [`validate`],
//! inside [`PvConfig::start`]. Options left unset fall back to the
//! [`ClientDefaults`] of the [`Client`](crate::Client) that created it.
//!
//! | Option               | Fallback                      | Validation                   |
//! |----------------------|-------------------------------|------------------------------|
//! | `source`             | client default                | required                     |
//! | `executor`           | client default                | required                     |
//! | `max_rate`           | client default (1 s)          | `> 0`                        |
//! | `connection_timeout` | none (no timeout)             | `> 0` when set               |
//! | `listeners`          | none                          | at least one                 |
//! | `runtime`            | client default, then ambient  | required                     |
//! | `mode`               | `Read`                        | expression has that side     |
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pvflow::{ConfigError, Event, Expression, InlineExecutor, LocalSource, Pv, PvConfig, validate};
//!
//! let cfg = PvConfig::new(Expression::<f64, f64>::channel("temp"))
//!     .with_source(Arc::new(LocalSource::<f64>::new("sim")))
//!     .with_executor(Arc::new(InlineExecutor))
//!     .with_max_rate(Duration::ZERO)
//!     .with_listener(|_: &Event, _: &Pv<f64, f64>| {});
//!
//! let err = validate(cfg, None).err();
//! assert_eq!(err, Some(ConfigError::InvalidMaxRate { rate: Duration::ZERO }));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::core::{ConnectionTimeout, Director, Pv};
use crate::error::{ConfigError, PvError};
use crate::executor::Executor;
use crate::expression::Expression;
use crate::listeners::{Listener, ListenerChain, ReadListener, ReadOnly, WriteListener, WriteOnly};
use crate::source::DataSource;

/// Default minimum interval between two deliveries.
pub const DEFAULT_MAX_RATE: Duration = Duration::from_secs(1);

/// Which sides of the expression a subscription connects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Read side only.
    #[default]
    Read,
    /// Write side only.
    Write,
    /// Both sides.
    ReadWrite,
}

impl Mode {
    pub(crate) fn reads(self) -> bool {
        matches!(self, Mode::Read | Mode::ReadWrite)
    }

    pub(crate) fn writes(self) -> bool {
        matches!(self, Mode::Write | Mode::ReadWrite)
    }
}

/// Process-wide fallbacks held by a [`Client`](crate::Client).
pub struct ClientDefaults<V> {
    /// Data source used when a configuration sets none.
    pub source: Option<Arc<dyn DataSource<V>>>,
    /// Execution context used when a configuration sets none.
    pub executor: Option<Arc<dyn Executor>>,
    /// Minimum interval between deliveries.
    pub max_rate: Duration,
    /// Runtime driving timers; the ambient runtime is used when unset.
    pub runtime: Option<Handle>,
}

impl<V> Default for ClientDefaults<V> {
    /// Provides the defaults:
    /// - no source, no executor
    /// - `max_rate = 1s`
    /// - ambient runtime
    fn default() -> Self {
        Self {
            source: None,
            executor: None,
            max_rate: DEFAULT_MAX_RATE,
            runtime: None,
        }
    }
}

impl<V> Clone for ClientDefaults<V> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            executor: self.executor.clone(),
            max_rate: self.max_rate,
            runtime: self.runtime.clone(),
        }
    }
}

impl<V> fmt::Debug for ClientDefaults<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDefaults")
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("executor", &self.executor.as_ref().map(|e| e.name()))
            .field("max_rate", &self.max_rate)
            .finish()
    }
}

/// Single-use configuration of one subscription.
pub struct PvConfig<R, V> {
    /// Channels and read semantics.
    pub expression: Expression<R, V>,
    /// Connected sides.
    pub mode: Mode,
    /// Data source override.
    pub source: Option<Arc<dyn DataSource<V>>>,
    /// Execution context override.
    pub executor: Option<Arc<dyn Executor>>,
    /// Minimum interval between deliveries override.
    pub max_rate: Option<Duration>,
    /// Connection timeout (none by default).
    pub connection_timeout: Option<ConnectionTimeout>,
    /// Listeners in registration order.
    pub listeners: Vec<Arc<dyn Listener<R, V>>>,
    /// Runtime override.
    pub runtime: Option<Handle>,
    /// Fallbacks for unset options.
    pub defaults: ClientDefaults<V>,
}

impl<R, V> PvConfig<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    /// Read configuration without client defaults.
    pub fn new(expression: Expression<R, V>) -> Self {
        Self::with_defaults(expression, Mode::Read, ClientDefaults::default())
    }

    pub(crate) fn with_defaults(
        expression: Expression<R, V>,
        mode: Mode,
        defaults: ClientDefaults<V>,
    ) -> Self {
        Self {
            expression,
            mode,
            source: None,
            executor: None,
            max_rate: None,
            connection_timeout: None,
            listeners: Vec::new(),
            runtime: None,
            defaults,
        }
    }

    /// Sets the connected sides.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the data source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DataSource<V>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the execution context listeners run on.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Sets the minimum interval between two deliveries.
    #[must_use]
    pub fn with_max_rate(mut self, rate: Duration) -> Self {
        self.max_rate = Some(rate);
        self
    }

    /// Reports an error if no connection is observed within `timeout`.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(ConnectionTimeout::new(timeout));
        self
    }

    /// Like [`with_connection_timeout`](Self::with_connection_timeout), with
    /// a custom message on the error.
    #[must_use]
    pub fn with_connection_timeout_message(
        mut self,
        timeout: Duration,
        message: impl Into<String>,
    ) -> Self {
        self.connection_timeout = Some(ConnectionTimeout::new(timeout).with_message(message));
        self
    }

    /// Appends a listener to the chain.
    #[must_use]
    pub fn with_listener(mut self, listener: impl Listener<R, V> + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Appends a listener the caller keeps a handle to.
    #[must_use]
    pub fn with_shared_listener(mut self, listener: Arc<dyn Listener<R, V>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Appends a read-only listener to the chain.
    #[must_use]
    pub fn with_read_listener(mut self, listener: impl ReadListener<R>) -> Self {
        self.listeners.push(Arc::new(ReadOnly(listener)));
        self
    }

    /// Appends a write-only listener to the chain.
    #[must_use]
    pub fn with_write_listener(mut self, listener: impl WriteListener<V>) -> Self {
        self.listeners.push(Arc::new(WriteOnly(listener)));
        self
    }

    /// Sets the runtime driving timers.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Validates the configuration and starts the subscription.
    ///
    /// Without a configured runtime the ambient one is used. The subscription
    /// lives as long as the returned [`Pv`] (or a clone of it): dropping the
    /// last handle closes it.
    ///
    /// # Errors
    /// [`PvError::Config`] if validation fails; the subscription never begins.
    pub fn start(self) -> Result<Pv<R, V>, PvError> {
        let ambient = Handle::try_current().ok();
        let validated = validate(self, ambient)?;
        let director = Director::new(validated);
        director.start()?;
        Ok(Pv::from_director(director))
    }
}

/// Configuration resolved against its defaults.
pub struct Validated<R, V> {
    pub(crate) expression: Expression<R, V>,
    pub(crate) mode: Mode,
    pub(crate) source: Arc<dyn DataSource<V>>,
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) max_rate: Duration,
    pub(crate) connection_timeout: Option<ConnectionTimeout>,
    pub(crate) listeners: ListenerChain<R, V>,
    pub(crate) runtime: Handle,
}

impl<R: 'static, V: 'static> Validated<R, V> {
    /// Effective minimum interval between deliveries.
    pub fn max_rate(&self) -> Duration {
        self.max_rate
    }

    /// Effective source name.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Effective connected sides.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Resolves `config` against its defaults and checks every option.
///
/// `ambient` is the runtime used when neither the configuration nor the
/// defaults name one.
///
/// # Errors
/// The first failed check, in table order of the module docs.
pub fn validate<R, V>(
    config: PvConfig<R, V>,
    ambient: Option<Handle>,
) -> Result<Validated<R, V>, ConfigError>
where
    R: 'static,
    V: 'static,
{
    let PvConfig {
        expression,
        mode,
        source,
        executor,
        max_rate,
        connection_timeout,
        listeners,
        runtime,
        defaults,
    } = config;

    if mode.reads() && expression.bindings.is_empty() {
        return Err(ConfigError::MissingReadExpression);
    }
    if mode.writes() && expression.write_channel.is_none() {
        return Err(ConfigError::MissingWriteExpression);
    }

    let source = source
        .or(defaults.source)
        .ok_or(ConfigError::MissingSource)?;
    let executor = executor
        .or(defaults.executor)
        .ok_or(ConfigError::MissingExecutor)?;

    let max_rate = max_rate.unwrap_or(defaults.max_rate);
    if max_rate.is_zero() {
        return Err(ConfigError::InvalidMaxRate { rate: max_rate });
    }
    if let Some(timeout) = connection_timeout.as_ref().map(|t| t.timeout) {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout { timeout });
        }
    }

    if listeners.is_empty() {
        return Err(ConfigError::MissingListener);
    }

    let runtime = runtime
        .or(defaults.runtime)
        .or(ambient)
        .ok_or(ConfigError::MissingRuntime)?;

    Ok(Validated {
        expression,
        mode,
        source,
        executor,
        max_rate,
        connection_timeout,
        listeners: ListenerChain::new(listeners),
        runtime,
    })
}
