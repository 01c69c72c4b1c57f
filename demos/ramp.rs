//! # Rate-decoupling demo
//!
//! A simulated device ramps a value every millisecond from a plain thread.
//! Two subscriptions watch it:
//! - `fast`: latest value at most every 100ms, logged by the built-in listener
//! - `avg`: average of two channels, pulled every 250ms, counted by a custom listener
//!
//! A setpoint write goes through a read-write subscription.
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example ramp --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use pvflow::{Client, Event, Expression, LocalSource, LogListener, Pv, SerialExecutor};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

struct Counter {
    values: AtomicU64,
}

impl pvflow::Listener<f64, f64> for Counter {
    fn on_event(&self, event: &Event, pv: &Pv<f64, f64>) {
        if *event == Event::ValueChanged {
            let n = self.values.fetch_add(1, Ordering::Relaxed) + 1;
            println!("avg #{n}: {:?}", pv.latest_value());
        }
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let device = Arc::new(LocalSource::<f64>::new("sim"));
    let ui = Arc::new(SerialExecutor::new(
        "ui",
        SerialExecutor::DEFAULT_CAPACITY,
        &Handle::current(),
    ));
    let client = Client::<f64>::new()
        .with_source(device.clone())
        .with_executor(ui.clone());

    let fast = client
        .read(Expression::channel("ramp"))
        .with_max_rate(Duration::from_millis(100))
        .with_connection_timeout(Duration::from_millis(500))
        .with_listener(LogListener)
        .start()?;

    let counter = Arc::new(Counter {
        values: AtomicU64::new(0),
    });
    let avg = client
        .read(Expression::combine(["ramp", "offset"], |v: &[Option<f64>]| {
            let known: Vec<f64> = v.iter().flatten().copied().collect();
            (!known.is_empty()).then(|| known.iter().sum::<f64>() / known.len() as f64)
        }))
        .with_max_rate(Duration::from_millis(250))
        .with_shared_listener(counter.clone())
        .start()?;

    let setpoint = client
        .read_write(Expression::channel("offset"))
        .with_max_rate(Duration::from_millis(100))
        .with_listener(LogListener)
        .start()?;

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let device = Arc::clone(&device);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut x = 0.0;
            while !stop.load(Ordering::Relaxed) {
                device.set("ramp", x);
                x += 1.0;
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    device.set_connected("offset", true);
    setpoint.write(1000.0)?;

    tokio::time::sleep(Duration::from_millis(700)).await;
    avg.pause()?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    avg.resume()?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    stop.store(true, Ordering::Relaxed);
    let _ = producer.join();
    fast.close();
    avg.close();
    setpoint.close();
    ui.shutdown().await;

    println!(
        "fast saw {:?}, avg delivered {} values",
        fast.latest_value(),
        counter.values.load(Ordering::Relaxed)
    );
    Ok(())
}
