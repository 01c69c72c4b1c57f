//! Subscription core: orchestration and lifecycle.
//!
//! The only public API from this module is the [`Pv`] handle and its
//! [`PvReader`] / [`PvWriter`] views, plus the [`ConnectionTimeout`] option.
//!
//! Internal modules:
//! - [`director`]: owns collectors, scheduler and listener chain; close contract;
//! - [`delivery`]: pending-event accumulator and per-delivery event order;
//! - [`timeout`]: one-shot connection timeout;
//! - [`pv`]: the subscription handle.

mod delivery;
mod director;
mod pv;
mod timeout;

pub(crate) use director::Director;
pub use pv::{Pv, PvReader, PvWriter};
pub use timeout::{ConnectionTimeout, DEFAULT_TIMEOUT_MESSAGE};
