//! # Consumer listeners.
//!
//! A listener receives every event of a subscription together with the
//! subscription handle, from which it reads the current state:
//!
//! ```text
//! Director ──submit(job)──► Executor ──► ListenerChain
//!                                          ├──► listener 1.on_event(&ev, &pv)
//!                                          ├──► listener 2.on_event(&ev, &pv)   (panic → warn!, chain continues)
//!                                          └──► listener N.on_event(&ev, &pv)
//! ```
//!
//! ## Shapes
//! - [`Listener`] full contract: every event, full [`Pv`](crate::Pv) handle
//! - [`ReadListener`] read events only, through the [`PvReader`](crate::PvReader) view
//! - [`WriteListener`] write events only, through the [`PvWriter`](crate::PvWriter) view
//!
//! The narrow shapes are merged into the full contract by filtering adapters.
//! Registering several listeners builds a chain, never a replacement.
//!
//! ## Example
//! ```rust
//! use pvflow::{Event, Listener, Pv};
//!
//! struct Printer;
//!
//! impl Listener<f64, f64> for Printer {
//!     fn on_event(&self, event: &Event, pv: &Pv<f64, f64>) {
//!         if *event == Event::ValueChanged {
//!             println!("{} = {:?}", pv.name(), pv.latest_value());
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "printer" }
//! }
//! ```

mod chain;
mod listener;
#[cfg(feature = "logging")]
mod log;

pub use chain::ListenerChain;
pub use listener::{Listener, ReadListener, ReadOnly, WriteListener, WriteOnly};
#[cfg(feature = "logging")]
pub use log::LogListener;
