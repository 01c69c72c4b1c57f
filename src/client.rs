//! # Client: holder of process defaults and entry point for subscriptions.
//!
//! ```text
//! Client { source, executor, max_rate, runtime }
//!   ├── read(expr)       ─► PvConfig (Mode::Read)
//!   ├── write(expr)      ─► PvConfig (Mode::Write)
//!   └── read_write(expr) ─► PvConfig (Mode::ReadWrite)
//! ```
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pvflow::{Client, Event, Expression, InlineExecutor, LocalSource, Pv};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pvflow::PvError> {
//! let source = Arc::new(LocalSource::<f64>::new("sim"));
//! let client = Client::<f64>::new()
//!     .with_source(source.clone())
//!     .with_executor(Arc::new(InlineExecutor))
//!     .with_max_rate(Duration::from_millis(100));
//!
//! let pv = client
//!     .read(Expression::<f64, f64>::channel("temp"))
//!     .with_listener(|ev: &Event, pv: &Pv<f64, f64>| println!("{ev:?} {:?}", pv.latest_value()))
//!     .start()?;
//!
//! source.set("temp", 21.5);
//! pv.close();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::config::{ClientDefaults, Mode, PvConfig};
use crate::executor::Executor;
use crate::expression::Expression;
use crate::source::DataSource;

/// Factory of subscription configurations sharing one set of defaults.
#[derive(Debug)]
pub struct Client<V> {
    defaults: ClientDefaults<V>,
}

impl<V> Default for Client<V> {
    fn default() -> Self {
        Self {
            defaults: ClientDefaults::default(),
        }
    }
}

impl<V> Clone for Client<V> {
    fn clone(&self) -> Self {
        Self {
            defaults: self.defaults.clone(),
        }
    }
}

impl<V: Send + 'static> Client<V> {
    /// Creates a client with no default source or executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default data source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DataSource<V>>) -> Self {
        self.defaults.source = Some(source);
        self
    }

    /// Sets the default execution context.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.defaults.executor = Some(executor);
        self
    }

    /// Sets the default minimum interval between deliveries.
    #[must_use]
    pub fn with_max_rate(mut self, rate: Duration) -> Self {
        self.defaults.max_rate = rate;
        self
    }

    /// Sets the default runtime driving timers.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.defaults.runtime = Some(runtime);
        self
    }

    /// Current defaults.
    pub fn defaults(&self) -> &ClientDefaults<V> {
        &self.defaults
    }

    /// Configuration reading `expression`.
    pub fn read<R>(&self, expression: Expression<R, V>) -> PvConfig<R, V>
    where
        R: Clone + Send + Sync + 'static,
    {
        PvConfig::with_defaults(expression, Mode::Read, self.defaults.clone())
    }

    /// Configuration writing to `expression`'s write channel.
    pub fn write<R>(&self, expression: Expression<R, V>) -> PvConfig<R, V>
    where
        R: Clone + Send + Sync + 'static,
    {
        PvConfig::with_defaults(expression, Mode::Write, self.defaults.clone())
    }

    /// Configuration reading and writing `expression`.
    pub fn read_write<R>(&self, expression: Expression<R, V>) -> PvConfig<R, V>
    where
        R: Clone + Send + Sync + 'static,
    {
        PvConfig::with_defaults(expression, Mode::ReadWrite, self.defaults.clone())
    }
}
