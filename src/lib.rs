//! # pvflow
//!
//! **pvflow** is a client-side subscription library for remotely-sourced,
//! continuously-updating values ("process variables").
//!
//! A data source may push updates from any thread at any rate. pvflow
//! coalesces them and delivers them to the consumer's listeners at a bounded,
//! configurable rate, on an execution context the consumer chooses.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ DataSource   │   │ DataSource   │   │ DataSource   │
//!     │ (thread #1)  │   │ (thread #2)  │   │ (thread #3)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ update_*()       ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Collector   │   │  Collector   │   │WriteCollector│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──── Notification ┴──────────────────┘
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Director (one per subscription)                                  │
//! │  - Pending (accumulated notifications)                            │
//! │  - NotificationScheduler (reactive | pull, at most 1 in flight)   │
//! │  - ListenerChain (registration order, per-listener isolation)     │
//! │  - lifecycle CREATED → ACTIVE → CLOSED                            │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼ submit(job)
//!                       ┌────────────────────┐
//!                       │  Executor          │
//!                       │ inline/serial/pool │
//!                       └─────────┬──────────┘
//!                       ┌─────────┼─────────┐
//!                       ▼         ▼         ▼
//!                   listener1 listener2 listenerN   (&Event, &Pv)
//! ```
//!
//! ### Tick
//! ```text
//! every max_rate (first tick one interval after start):
//!   ├─► demand? (active and not paused)        no ─► skip
//!   ├─► reactive: dirty?                        no ─► skip
//!   ├─► previous delivery still running?       yes ─► skip (not queued)
//!   ├─► build Delivery: connections, value (latest or pulled), errors, write outcomes
//!   └─► executor.submit(job)
//!         └─► job: CLOSED? ─► update handle snapshot ─► events to listeners in order
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                                   |
//! |-------------------|----------------------------------------------------------------|------------------------------------------------------|
//! | **Collectors**    | Thread-safe mailboxes between sources and the scheduler.       | [`PushCollector`], [`ReadFunction`], [`ReadCollector`] |
//! | **Scheduling**    | Rate bound, coalescing, backpressure.                          | [`NotificationScheduler`], [`ReactiveScheduler`], [`PullScheduler`] |
//! | **Listeners**     | Consumer callbacks, full or read/write-only.                   | [`Listener`], [`ReadListener`], [`WriteListener`]    |
//! | **Handles**       | Synchronous state, pause/resume, writes, idempotent close.     | [`Pv`], [`PvReader`], [`PvWriter`]                   |
//! | **Execution**     | Where listeners run.                                           | [`Executor`], [`InlineExecutor`], [`SerialExecutor`], [`PoolExecutor`] |
//! | **Sources**       | What feeds the collectors.                                     | [`DataSource`], [`LocalSource`], [`WriteCompletion`] |
//! | **Configuration** | Single-use, validated once at start.                           | [`PvConfig`], [`Client`], [`validate`]               |
//! | **Errors**        | Synchronous misuse vs. asynchronous runtime failures.          | [`PvError`], [`ConfigError`], [`LifecycleError`], [`SourceError`], [`SubmitError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pvflow::{Client, Event, Expression, LocalSource, Pv, SerialExecutor};
//! use tokio::runtime::Handle;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(LocalSource::<f64>::new("sim"));
//!     let ui = Arc::new(SerialExecutor::new("ui", 64, &Handle::current()));
//!     let client = Client::<f64>::new()
//!         .with_source(source.clone())
//!         .with_executor(ui.clone())
//!         .with_max_rate(Duration::from_millis(50));
//!
//!     let pv = client
//!         .read(Expression::<f64, f64>::channel("temp"))
//!         .with_connection_timeout(Duration::from_secs(2))
//!         .with_listener(|ev: &Event, pv: &Pv<f64, f64>| {
//!             if *ev == Event::ValueChanged {
//!                 println!("temp = {:?}", pv.latest_value());
//!             }
//!         })
//!         .start()?;
//!
//!     for i in 0..10 {
//!         source.set("temp", 20.0 + f64::from(i));
//!     }
//!     tokio::time::sleep(Duration::from_millis(120)).await;
//!
//!     pv.close();
//!     ui.shutdown().await;
//!     Ok(())
//! }
//! ```

mod client;
mod collectors;
mod config;
mod core;
mod error;
mod events;
mod executor;
mod expression;
mod listeners;
mod scheduler;
mod source;
mod sync;

// ---- Public re-exports ----

pub use client::Client;
pub use collectors::{
    Collector, CollectorStore, LatestValue, LatestValueCollector, NotificationTarget,
    PushCollector, QueueCollector, ReadCollector, ReadFunction, ValueQueue, WriteCollector,
};
pub use config::{ClientDefaults, DEFAULT_MAX_RATE, Mode, PvConfig, Validated, validate};
pub use core::{ConnectionTimeout, DEFAULT_TIMEOUT_MESSAGE, Pv, PvReader, PvWriter};
pub use error::{ConfigError, LifecycleError, PvError, SourceError, SubmitError};
pub use events::{Event, Notification};
pub use executor::{Executor, InlineExecutor, Job, PoolExecutor, SerialExecutor};
pub use expression::Expression;
pub use listeners::{Listener, ListenerChain, ReadListener, ReadOnly, WriteListener, WriteOnly};
pub use scheduler::{
    DeliveryTarget, InFlight, NotificationScheduler, PullScheduler, PullTarget,
    ReactiveScheduler, SchedulerState, SchedulingPolicy,
};
pub use source::{DataSource, LocalSource, WriteCompletion};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
