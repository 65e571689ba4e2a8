use std::sync::Arc;
use std::time::Duration;

use safecross_core::config::ProximityConfig;
use safecross_core::mocks::MockSpeaker;
use safecross_core::{Position, SignalLocation};
use safecross_proximity::{MonitorRuntime, ProximityTier};
use tokio::sync::watch;

const M_PER_DEG: f64 = 111_194.93;

fn origin() -> Position {
    Position::new(-22.2231, -54.8124)
}

fn north(meters: f64) -> Position {
    Position::new(origin().lat + meters / M_PER_DEG, origin().lng)
}

fn signal_at(meters_north: f64) -> SignalLocation {
    let p = north(meters_north);
    SignalLocation::new(1, p.lat, p.lng, "Av. Marcelino Pires")
}

fn runtime(signals: Vec<SignalLocation>, speaker: Arc<MockSpeaker>) -> MonitorRuntime {
    MonitorRuntime::new(ProximityConfig::default(), signals, speaker)
}

#[tokio::test(start_paused = true)]
async fn test_very_near_alerts_are_throttled() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(vec![signal_at(3.0)], speaker.clone());
    let (_tx, rx) = watch::channel(Some(origin()));

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(5_100)).await;
    rt.stop().await;

    // Very-near alerts repeat, but never more than once per two seconds.
    let spoken = speaker.spoken();
    assert_eq!(spoken.len(), 3);
    assert!(spoken.iter().all(|u| u.urgent));
    assert!(spoken[0].text.starts_with("Warning! Av. Marcelino Pires at 3 meters"));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_utterance_suppresses_new_ones() {
    let speaker = Arc::new(MockSpeaker::with_duration(Duration::from_secs(5)));
    let mut rt = runtime(vec![signal_at(2.0)], speaker.clone());
    let (_tx, rx) = watch::channel(Some(origin()));

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(speaker.count(), 1);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(speaker.count(), 2);
    rt.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_position_update_triggers_evaluation() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(vec![signal_at(0.0)], speaker.clone());
    let (tx, rx) = watch::channel(Some(north(-100.0)));
    let mut status = rt.subscribe();

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    {
        let eval = status.borrow_and_update();
        let alert = eval.as_ref().unwrap().alert.as_ref().unwrap();
        assert_eq!(alert.distance_m, 100);
        assert_eq!(alert.tier, ProximityTier::Distant);
    }

    tx.send(Some(north(-8.0))).unwrap();
    status.changed().await.unwrap();
    {
        let eval = status.borrow_and_update();
        let alert = eval.as_ref().unwrap().alert.as_ref().unwrap();
        assert_eq!(alert.distance_m, 8);
        assert_eq!(alert.tier, ProximityTier::Near);
    }

    rt.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_position_falls_back_to_default() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(vec![signal_at(30.0)], speaker.clone());
    let (_tx, rx) = watch::channel(None);
    let status = rt.subscribe();

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(600)).await;

    let eval = status.borrow().clone().unwrap();
    assert!(eval.location_unavailable);
    assert_eq!(eval.position, ProximityConfig::default().default_position);
    assert_eq!(eval.alert.unwrap().distance_m, 30);
    rt.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_signal_list_never_speaks() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(Vec::new(), speaker.clone());
    let (_tx, rx) = watch::channel(Some(origin()));
    let status = rt.subscribe();

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    rt.stop().await;

    assert_eq!(speaker.count(), 0);
    assert!(status.borrow().as_ref().unwrap().alert.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_speaker_failure_is_not_fatal() {
    let speaker = Arc::new(MockSpeaker::failing());
    let mut rt = runtime(vec![signal_at(1.0)], speaker.clone());
    let (_tx, rx) = watch::channel(Some(origin()));

    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert!(rt.is_running());
    assert_eq!(speaker.count(), 2);
    rt.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_and_stop_are_idempotent() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(vec![signal_at(3.0)], speaker.clone());
    let (tx, rx) = watch::channel(Some(origin()));

    rt.stop().await;
    assert!(!rt.is_running());

    rt.start(rx.clone()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    // Restarting tears down the first watch; the new run starts fresh and
    // announces again.
    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(rt.is_running());
    assert_eq!(speaker.count(), 2);

    rt.stop().await;
    rt.stop().await;
    assert!(!rt.is_running());

    // Nothing speaks once stopped.
    tx.send_replace(Some(north(1.0)));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(speaker.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_loop() {
    let speaker = Arc::new(MockSpeaker::new());
    let (_tx, rx) = watch::channel(Some(origin()));
    let status = {
        let mut rt = runtime(vec![signal_at(3.0)], speaker.clone());
        let status = rt.subscribe();
        rt.start(rx).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        status
    };

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(speaker.count(), 1);
    assert!(status.has_changed().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_restart_and_stop_cancel_speech_in_progress() {
    let speaker = Arc::new(MockSpeaker::with_duration(Duration::from_secs(10)));
    let mut rt = runtime(vec![signal_at(3.0)], speaker.clone());
    let (_tx, rx) = watch::channel(Some(origin()));

    rt.start(rx.clone()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    rt.start(rx).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    rt.stop().await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(speaker.count(), 2);
    assert_eq!(speaker.finished(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_waits_for_previous_loop() {
    let speaker = Arc::new(MockSpeaker::new());
    let mut rt = runtime(vec![signal_at(3.0)], speaker.clone());
    let (tx, _rx) = watch::channel(Some(origin()));

    rt.start(tx.subscribe()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(tx.receiver_count(), 2);

    // The previous loop has released its position receiver by the time the
    // new one is running.
    rt.start(tx.subscribe()).await;
    assert_eq!(tx.receiver_count(), 2);

    rt.stop().await;
    assert_eq!(tx.receiver_count(), 1);
}
