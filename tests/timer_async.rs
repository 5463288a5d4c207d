use std::sync::Arc;

use match3_engine::{spawn_countdown, Countdown, TimerConfig, TimerEvent, TimerState};
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::Mutex;
use tokio::time::Duration;

fn short_round() -> Countdown {
    Countdown::new(&TimerConfig {
        duration_secs: 3,
        warning_secs: 2,
        almost_done_secs: 1,
    })
}

#[tokio::test(start_paused = true)]
async fn test_background_countdown_runs_to_completion() {
    let mut timer = short_round();
    timer.start();
    let timer = Arc::new(Mutex::new(timer));

    let (tx, mut rx) = unbounded_channel();
    let handle = spawn_countdown(timer.clone(), Duration::from_secs(1), tx);
    handle.await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![
            TimerEvent::Tick { remaining_secs: 2 },
            TimerEvent::Warning { remaining_secs: 2 },
            TimerEvent::Tick { remaining_secs: 1 },
            TimerEvent::Tick { remaining_secs: 0 },
            TimerEvent::Completed,
        ]
    );

    let timer = timer.lock().await;
    assert!(timer.is_finished());
    assert_eq!(timer.state(), TimerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_pause_holds_background_countdown() {
    let mut timer = short_round();
    timer.start();
    let timer = Arc::new(Mutex::new(timer));

    let (tx, mut rx) = unbounded_channel();
    let handle = spawn_countdown(timer.clone(), Duration::from_secs(1), tx);

    assert_eq!(
        rx.recv().await,
        Some(TimerEvent::Tick { remaining_secs: 2 })
    );
    timer.lock().await.pause();

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(timer.lock().await.remaining(), 2);

    timer.lock().await.resume();
    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    assert_eq!(last, Some(TimerEvent::Completed));
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_unstarted_countdown_ends_task() {
    let timer = Arc::new(Mutex::new(short_round()));
    let (tx, mut rx) = unbounded_channel();

    spawn_countdown(timer.clone(), Duration::from_secs(1), tx)
        .await
        .unwrap();

    assert_eq!(rx.recv().await, None);
    assert_eq!(timer.lock().await.remaining(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_receiver_ends_task() {
    let mut timer = Countdown::with_duration(60);
    timer.start();
    let timer = Arc::new(Mutex::new(timer));

    let (tx, rx) = unbounded_channel();
    drop(rx);
    spawn_countdown(timer.clone(), Duration::from_secs(1), tx)
        .await
        .unwrap();

    let timer = timer.lock().await;
    assert!(timer.remaining() >= 59);
    assert!(!timer.is_finished());
}
