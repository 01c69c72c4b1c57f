//! # Director: one subscription's orchestrator.
//!
//! Owns the collectors of the configured expression, the scheduler and the
//! listener chain, and turns scheduler decisions into listener calls.
//!
//! ## Architecture
//! ```text
//! source thread(s) ──► collector ──target──► on_notification ──► Pending + scheduler.notify()
//!
//! tick ──► deliver / deliver_pulled
//!            ├─► collect(): Pending + collector connections ─► Delivery
//!            └─► executor.submit(job) ──► run(): dispatch lock
//!                                            ├─► CLOSED? stop
//!                                            ├─► apply snapshot to the handle
//!                                            └─► for each event: for each listener: CLOSED? stop, call
//! ```
//!
//! ## Rules
//! - `CREATED → ACTIVE` once, on `start()`; `ACTIVE → CLOSED` once, on `close()`.
//! - Demand (the desired-rate callback) is "active and not paused".
//! - The CLOSED flag is checked right before every listener call, while the
//!   dispatch lock is held. Every `close()` call takes the same lock after
//!   the flag is flipped, so once any call returns no listener runs again. When `close()` is
//!   called from inside a listener, the barrier is skipped (the calling
//!   dispatch stops at its next check).
//! - The connection timeout is armed by `start()` and disarmed by the first
//!   `connected == true` notification of any collector.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::collectors::{Collector, NotificationTarget, ReadFunction, WriteCollector};
use crate::config::Validated;
use crate::error::{LifecycleError, SourceError, SubmitError};
use crate::events::Notification;
use crate::executor::Executor;
use crate::expression::ChannelBinding;
use crate::listeners::ListenerChain;
use crate::scheduler::{
    DeliveryTarget, InFlight, NotificationScheduler, PullScheduler, PullTarget,
    ReactiveScheduler, SchedulingPolicy,
};
use crate::source::{DataSource, WriteCompletion};
use crate::sync::lock;

use super::delivery::{Delivery, Pending};
use super::pv::Pv;
use super::timeout::{ConnectionTimeout, TimeoutArm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectorState {
    Created,
    Active,
    Closed,
}

struct WriteSide {
    channel: String,
    collector: Arc<WriteCollector>,
}

/// Last delivered state, readable synchronously through the handle.
#[derive(Debug)]
pub(crate) struct Snapshot<R> {
    pub(crate) value: Option<R>,
    pub(crate) read_connected: bool,
    pub(crate) write_connected: bool,
    pub(crate) last_error: Option<SourceError>,
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            value: None,
            read_connected: false,
            write_connected: false,
            last_error: None,
        }
    }
}

impl<R> Snapshot<R> {
    fn apply(&mut self, delivery: Delivery<R>) {
        if let Some(err) = delivery.last_error() {
            self.last_error = Some(err.clone());
        }
        if let Some(c) = delivery.read_connected {
            self.read_connected = c;
        }
        if let Some(c) = delivery.write_connected {
            self.write_connected = c;
        }
        if let Some(value) = delivery.value {
            self.value = value;
        }
    }
}

pub(crate) struct Director<R, V> {
    me: Weak<Director<R, V>>,
    name: String,
    state: Mutex<DirectorState>,
    paused: AtomicBool,
    reads: Vec<ChannelBinding<V>>,
    read: Option<Arc<dyn ReadFunction<Option<R>>>>,
    write: Option<WriteSide>,
    source: Arc<dyn DataSource<V>>,
    executor: Arc<dyn Executor>,
    listeners: ListenerChain<R, V>,
    scheduler: Box<dyn NotificationScheduler>,
    pending: Mutex<Pending>,
    snapshot: Mutex<Snapshot<R>>,
    dispatch: Mutex<()>,
    dispatching: Mutex<Option<ThreadId>>,
    timeout: Option<ConnectionTimeout>,
    timeout_arm: TimeoutArm,
    runtime: Handle,
}

impl<R, V> Director<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    /// Assembles collectors, scheduler and listener chain. Nothing runs yet.
    pub(crate) fn new(config: Validated<R, V>) -> Arc<Self> {
        let Validated {
            expression,
            mode,
            source,
            executor,
            max_rate,
            connection_timeout,
            listeners,
            runtime,
        } = config;

        let reads_enabled = mode.reads();
        let policy = if reads_enabled {
            expression.policy
        } else {
            SchedulingPolicy::Reactive
        };
        let name = if reads_enabled {
            expression.name()
        } else {
            expression.write_channel.clone().unwrap_or_default()
        };
        let write = match (mode.writes(), expression.write_channel) {
            (true, Some(channel)) => Some(WriteSide {
                channel,
                collector: Arc::new(WriteCollector::new()),
            }),
            _ => None,
        };
        let pull = Arc::clone(&expression.read);
        let (reads, read) = if reads_enabled {
            (expression.bindings, Some(expression.read))
        } else {
            (Vec::new(), None)
        };

        Arc::new_cyclic(|me: &Weak<Self>| {
            let scheduler: Box<dyn NotificationScheduler> = match policy {
                SchedulingPolicy::Reactive => {
                    let target: Weak<dyn DeliveryTarget> = me.clone();
                    Box::new(ReactiveScheduler::new(max_rate, runtime.clone(), target))
                }
                SchedulingPolicy::Pull => {
                    let target: Weak<dyn PullTarget<Option<R>>> = me.clone();
                    Box::new(PullScheduler::new(max_rate, runtime.clone(), pull, target))
                }
            };
            Self {
                me: me.clone(),
                name,
                state: Mutex::new(DirectorState::Created),
                paused: AtomicBool::new(false),
                reads,
                read,
                write,
                source,
                executor,
                listeners,
                scheduler,
                pending: Mutex::new(Pending::default()),
                snapshot: Mutex::new(Snapshot::default()),
                dispatch: Mutex::new(()),
                dispatching: Mutex::new(None),
                timeout: connection_timeout,
                timeout_arm: TimeoutArm::default(),
                runtime,
            }
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn policy(&self) -> SchedulingPolicy {
        self.scheduler.policy()
    }

    pub(crate) fn max_rate(&self) -> Duration {
        self.scheduler.max_rate()
    }

    pub(crate) fn snapshot(&self) -> std::sync::MutexGuard<'_, Snapshot<R>> {
        lock(&self.snapshot)
    }

    pub(crate) fn is_closed(&self) -> bool {
        *lock(&self.state) == DirectorState::Closed
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Wires collectors, arms the timeout, connects the source and starts ticking.
    pub(crate) fn start(&self) -> Result<(), LifecycleError> {
        {
            let mut state = lock(&self.state);
            match *state {
                DirectorState::Created => *state = DirectorState::Active,
                DirectorState::Active => return Err(LifecycleError::AlreadyStarted),
                DirectorState::Closed => return Err(LifecycleError::Closed { op: "start" }),
            }
        }

        for binding in &self.reads {
            binding
                .control
                .set_notification_target(Some(self.notification_target()));
        }
        if let Some(write) = &self.write {
            write
                .collector
                .set_notification_target(Some(self.notification_target()));
        }

        if let Some(timeout) = self.timeout.clone() {
            let me = self.me.clone();
            let window = timeout.timeout;
            self.timeout_arm.arm(&self.runtime, window, move || {
                if let Some(director) = me.upgrade() {
                    director.on_connection_timeout(timeout);
                }
            });
        }

        for binding in &self.reads {
            self.source
                .connect_read(&binding.channel, Arc::clone(&binding.push));
        }
        if let Some(write) = &self.write {
            self.source
                .connect_write(&write.channel, Arc::clone(&write.collector));
        }

        self.scheduler.start()?;
        tracing::debug!(
            pv = %self.name,
            source = self.source.name(),
            executor = self.executor.name(),
            policy = ?self.scheduler.policy(),
            "subscription started"
        );
        Ok(())
    }

    pub(crate) fn pause(&self) -> Result<(), LifecycleError> {
        if self.is_closed() {
            return Ok(());
        }
        self.paused.store(true, Ordering::Release);
        tracing::debug!(pv = %self.name, "subscription paused");
        self.scheduler.pause()
    }

    pub(crate) fn resume(&self) -> Result<(), LifecycleError> {
        if self.is_closed() {
            return Err(LifecycleError::Closed { op: "resume" });
        }
        self.paused.store(false, Ordering::Release);
        tracing::debug!(pv = %self.name, "subscription resumed");
        self.scheduler.resume()
    }

    pub(crate) fn write(&self, value: V) -> Result<(), LifecycleError> {
        if self.is_closed() {
            return Err(LifecycleError::Closed { op: "write" });
        }
        let Some(write) = &self.write else {
            return Err(LifecycleError::NotWritable);
        };
        self.source.write(
            &write.channel,
            value,
            WriteCompletion::new(Arc::clone(&write.collector)),
        );
        Ok(())
    }

    /// Closes the subscription. Idempotent; returns `true` on the first call.
    ///
    /// Every call, first or not, waits for a running dispatch to stop.
    pub(crate) fn close(&self) -> bool {
        let first = {
            let mut state = lock(&self.state);
            let first = *state != DirectorState::Closed;
            *state = DirectorState::Closed;
            first
        };
        if first {
            self.teardown();
        }

        let here = thread::current().id();
        let inside_listener = *lock(&self.dispatching) == Some(here);
        if !inside_listener {
            drop(lock(&self.dispatch));
        }
        if first {
            tracing::debug!(pv = %self.name, "subscription closed");
        }
        first
    }

    fn notification_target(&self) -> NotificationTarget {
        let me = self.me.clone();
        Arc::new(move |n: Notification| {
            if let Some(director) = me.upgrade() {
                director.on_notification(n);
            }
        })
    }

    fn on_notification(&self, notification: Notification) {
        if self.is_closed() {
            return;
        }
        if notification.connection() == Some(true) && self.timeout_arm.disarm() {
            tracing::debug!(pv = %self.name, "connection timeout disarmed");
        }
        lock(&self.pending).record(notification);
        self.scheduler.notify();
    }

    fn on_connection_timeout(&self, timeout: ConnectionTimeout) {
        if self.is_closed() {
            return;
        }
        tracing::debug!(pv = %self.name, timeout = ?timeout.timeout, "no connection within timeout");
        lock(&self.pending).errors.push(SourceError::ConnectionTimeout {
            timeout: timeout.timeout,
            message: timeout.message,
        });
        self.scheduler.notify();
    }

    fn collect(&self, pulled: Option<Option<R>>) -> Delivery<R> {
        let read_connected =
            (!self.reads.is_empty()).then(|| self.reads.iter().all(|b| b.control.connection()));
        let write_connected = self.write.as_ref().map(|w| w.collector.connection());

        let mut pending = lock(&self.pending);
        let value = match pulled {
            Some(value) => Some(value),
            None if pending.value => self.read.as_ref().map(|r| r.current_value()),
            None => None,
        };
        pending.take(value, read_connected, write_connected)
    }

    fn submit(&self, delivery: Delivery<R>, ticket: InFlight) {
        if delivery.is_empty() {
            return;
        }
        let Some(director) = self.me.upgrade() else {
            return;
        };
        let job = DispatchJob {
            director,
            delivery: Some(delivery),
            _ticket: ticket,
        };
        match self.executor.submit(Box::new(move || job.run())) {
            Ok(()) => {}
            Err(SubmitError::Full) => {
                tracing::debug!(pv = %self.name, executor = self.executor.name(), "delivery deferred");
                self.scheduler.notify();
            }
            Err(err) => {
                tracing::debug!(
                    pv = %self.name,
                    executor = self.executor.name(),
                    reason = err.as_label(),
                    "delivery held back"
                );
            }
        }
    }

    /// Puts a delivery the execution context never ran back into `Pending`.
    fn requeue(&self, delivery: Delivery<R>) {
        if self.is_closed() {
            return;
        }
        lock(&self.pending).restore(delivery);
    }

    /// Delivery job, run on the execution context.
    fn run(self: &Arc<Self>, delivery: Delivery<R>) {
        let _dispatch = lock(&self.dispatch);
        if self.is_closed() {
            return;
        }
        *lock(&self.dispatching) = Some(thread::current().id());

        let events = delivery.events();
        lock(&self.snapshot).apply(delivery);

        let pv = Pv::from_director(Arc::clone(self));
        for event in &events {
            if !self.listeners.dispatch(event, &pv, || !self.is_closed()) {
                break;
            }
        }
        *lock(&self.dispatching) = None;
    }
}

/// One delivery on its way to the execution context.
///
/// Holds the in-flight ticket until it has run. Dropped without running, it
/// hands the delivery back to the director.
struct DispatchJob<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    director: Arc<Director<R, V>>,
    delivery: Option<Delivery<R>>,
    _ticket: InFlight,
}

impl<R, V> DispatchJob<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn run(mut self) {
        if let Some(delivery) = self.delivery.take() {
            self.director.run(delivery);
        }
    }
}

impl<R, V> Drop for DispatchJob<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn drop(&mut self) {
        if let Some(delivery) = self.delivery.take() {
            self.director.requeue(delivery);
        }
    }
}

impl<R, V> DeliveryTarget for Director<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn has_demand(&self) -> bool {
        *lock(&self.state) == DirectorState::Active && !self.is_paused()
    }

    fn deliver(&self, ticket: InFlight) {
        let delivery = self.collect(None);
        self.submit(delivery, ticket);
    }
}

impl<R, V> PullTarget<Option<R>> for Director<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn deliver_pulled(&self, value: Option<R>, ticket: InFlight) {
        let delivery = self.collect(Some(value));
        self.submit(delivery, ticket);
    }
}

impl<R, V> Director<R, V> {
    /// Stops ticking and detaches from the collectors and the source.
    fn teardown(&self) {
        self.scheduler.close();
        self.timeout_arm.disarm();
        for binding in &self.reads {
            binding.control.set_notification_target(None);
            self.source.disconnect_read(&binding.channel, &binding.push);
        }
        if let Some(write) = &self.write {
            write.collector.set_notification_target(None);
            self.source
                .disconnect_write(&write.channel, &write.collector);
        }
    }
}

impl<R, V> Drop for Director<R, V> {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if *state != DirectorState::Closed {
            *state = DirectorState::Closed;
            self.teardown();
        }
    }
}
