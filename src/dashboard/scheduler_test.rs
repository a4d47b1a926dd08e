use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counting_task(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<Result<(), String>> + Send + Sync + 'static {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    }
}

/// Let spawned tick tasks run after time moves.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn first_tick_is_immediate_then_periodic() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut scheduler = Scheduler::new();
    scheduler.schedule("health", Duration::from_secs(10), counting_task(&counter));

    settle().await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(35)).await;
    settle().await;
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_future_ticks() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut scheduler = Scheduler::new();
    let handle = scheduler.schedule("documents", Duration::from_secs(60), counting_task(&counter));
    settle().await;

    assert!(scheduler.cancel(&handle));
    assert!(!scheduler.cancel(&handle));
    assert!(!scheduler.is_active(&handle));

    tokio::time::sleep(Duration::from_secs(300)).await;
    settle().await;
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_ticks_do_not_stop_the_timer() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&attempts);
    let mut scheduler = Scheduler::new();
    scheduler.schedule("collections", Duration::from_secs(5), move || {
        seen.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err::<(), _>("backend down"))
    });

    tokio::time::sleep(Duration::from_secs(21)).await;
    settle().await;
    assert_eq!(attempts.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn slow_ticks_do_not_delay_the_next_one() {
    let started = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&started);
    let mut scheduler = Scheduler::new();
    scheduler.schedule("slow", Duration::from_secs(1), move || {
        seen.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<(), String>(())
        }
    });

    tokio::time::sleep(Duration::from_millis(3500)).await;
    settle().await;
    assert_eq!(started.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn timers_are_independent_and_dropped_with_scheduler() {
    let fast = Arc::new(AtomicUsize::new(0));
    let slow = Arc::new(AtomicUsize::new(0));
    {
        let mut scheduler = Scheduler::new();
        scheduler.schedule("fast", Duration::from_secs(1), counting_task(&fast));
        scheduler.schedule("slow", Duration::from_secs(10), counting_task(&slow));
        assert_eq!(scheduler.active(), 2);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        settle().await;
        assert_eq!(fast.load(Ordering::SeqCst), 3);
        assert_eq!(slow.load(Ordering::SeqCst), 1);
    }

    tokio::time::sleep(Duration::from_secs(60)).await;
    settle().await;
    assert_eq!(fast.load(Ordering::SeqCst), 3);
}
