//! Concurrency properties under real threads and real time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use pvflow::{Client, Event, Expression, LocalSource, PoolExecutor, Pv};
use tokio::runtime::Handle;

fn pool_client(source: &Arc<LocalSource<u64>>, rate: Duration) -> Client<u64> {
    Client::new()
        .with_source(source.clone())
        .with_executor(Arc::new(PoolExecutor::new(Handle::current())))
        .with_max_rate(rate)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn listener_invocations_never_overlap() -> anyhow::Result<()> {
    let source = Arc::new(LocalSource::new("sim"));
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let spans = Arc::new(Mutex::new(Vec::<(Instant, Instant)>::new()));

    let (a, p, s) = (Arc::clone(&active), Arc::clone(&peak), Arc::clone(&spans));
    let pv = pool_client(&source, Duration::from_millis(5))
        .read(Expression::channel("x"))
        .with_listener(move |_: &Event, _: &Pv<u64, u64>| {
            let start = Instant::now();
            let now = a.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(3));
            a.fetch_sub(1, Ordering::SeqCst);
            s.lock().unwrap().push((start, Instant::now()));
        })
        .start()?;

    let stop = Arc::new(AtomicBool::new(false));
    let producers: Vec<_> = (0..4)
        .map(|id| {
            let source = Arc::clone(&source);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut n = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    source.set("x", id * 1_000_000 + n);
                    n += 1;
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(300)).await;
    stop.store(true, Ordering::Relaxed);
    for producer in producers {
        producer.join().expect("producer panicked");
    }
    pv.close();

    assert_eq!(peak.load(Ordering::SeqCst), 1);
    let spans = spans.lock().unwrap();
    assert!(spans.len() > 5, "only {} invocations", spans.len());
    for pair in spans.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlapping listener invocations");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_waits_for_the_running_listener_then_silences_the_rest() -> anyhow::Result<()> {
    let source = Arc::new(LocalSource::new("sim"));
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let first_done = Arc::new(AtomicBool::new(false));
    let after = Arc::new(AtomicUsize::new(0));

    let done = Arc::clone(&first_done);
    let count = Arc::clone(&after);
    let pv = pool_client(&source, Duration::from_millis(10))
        .read(Expression::channel("x"))
        .with_listener(move |_: &Event, _: &Pv<u64, u64>| {
            let _ = started_tx.lock().unwrap().send(());
            thread::sleep(Duration::from_millis(50));
            done.store(true, Ordering::SeqCst);
        })
        .with_listener(move |_: &Event, _: &Pv<u64, u64>| {
            count.fetch_add(1, Ordering::SeqCst);
        })
        .start()?;

    source.set("x", 1);
    tokio::task::spawn_blocking(move || started_rx.recv_timeout(Duration::from_secs(5)))
        .await??;

    let closer = pv.clone();
    let closed = tokio::task::spawn_blocking(move || closer.close()).await?;
    assert!(closed);
    assert!(first_done.load(Ordering::SeqCst));
    assert_eq!(after.load(Ordering::SeqCst), 0);

    source.set("x", 2);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(after.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_close_calls_close_once() -> anyhow::Result<()> {
    let source = Arc::new(LocalSource::new("sim"));
    let pv = pool_client(&source, Duration::from_millis(10))
        .read(Expression::channel("x"))
        .with_listener(|_: &Event, _: &Pv<u64, u64>| {})
        .start()?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pv = pv.clone();
            thread::spawn(move || pv.close())
        })
        .collect();
    let firsts = handles
        .into_iter()
        .map(|h| h.join().expect("closer panicked"))
        .filter(|first| *first)
        .count();
    assert_eq!(firsts, 1);
    assert!(pv.is_closed());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_close_call_waits_for_the_running_listener() -> anyhow::Result<()> {
    let source = Arc::new(LocalSource::new("sim"));
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let listener_done = Arc::new(AtomicBool::new(false));

    let done = Arc::clone(&listener_done);
    let pv = pool_client(&source, Duration::from_millis(10))
        .read(Expression::channel("x"))
        .with_listener(move |_: &Event, _: &Pv<u64, u64>| {
            let _ = started_tx.lock().unwrap().send(());
            thread::sleep(Duration::from_millis(50));
            done.store(true, Ordering::SeqCst);
        })
        .start()?;

    source.set("x", 1);
    tokio::task::spawn_blocking(move || started_rx.recv_timeout(Duration::from_secs(5)))
        .await??;

    let closers: Vec<_> = (0..2)
        .map(|_| {
            let pv = pv.clone();
            let done = Arc::clone(&listener_done);
            thread::spawn(move || {
                let first = pv.close();
                (first, done.load(Ordering::SeqCst))
            })
        })
        .collect();
    let outcomes: Vec<(bool, bool)> = closers
        .into_iter()
        .map(|h| h.join().expect("closer panicked"))
        .collect();

    assert_eq!(outcomes.iter().filter(|(first, _)| *first).count(), 1);
    assert!(outcomes.iter().all(|(_, listener_finished)| *listener_finished));
    Ok(())
}
