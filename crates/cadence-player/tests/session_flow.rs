//! End-to-end session tests against the threaded engine.
//!
//! These run real worker threads with short simulated media, so every wait is
//! bounded by a generous deadline.

#![allow(clippy::unwrap_used)]

use std::thread;
use std::time::{Duration, Instant};

use cadence_core::Track;
use cadence_engine::{EngineConfig, SimulatedBackend, ThreadedEngine};
use cadence_player::{PlaybackController, PlayerConfig, PlayerState, Synchronizer};

const DEADLINE: Duration = Duration::from_secs(5);

struct Harness {
    controller: PlaybackController<ThreadedEngine>,
    sync: Synchronizer,
}

impl Harness {
    fn new() -> Self {
        let engine = ThreadedEngine::new(
            SimulatedBackend,
            EngineConfig {
                position_interval_ms: 20,
                idle_poll_ms: 5,
            },
        )
        .unwrap();
        let controller = PlaybackController::with_engine(engine, PlayerConfig::default());
        let sync = Synchronizer::for_controller(&controller);
        Self { controller, sync }
    }

    /// Pump signals until `pred` holds or the deadline passes.
    fn pump_until(&mut self, pred: impl Fn(&PlaybackController<ThreadedEngine>) -> bool) -> bool {
        let deadline = Instant::now() + DEADLINE;
        while Instant::now() < deadline {
            self.sync.pump(&mut self.controller);
            if pred(&self.controller) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

fn track(id: &str, query: &str) -> Track {
    Track::new(id, format!("Track {id}"), format!("sim://{id}?{query}"))
}

#[test]
fn slow_media_recovers_through_data_loaded_retry() {
    let mut h = Harness::new();
    let slow = track("slow", "duration=30&load_ms=120");
    h.controller
        .play(Some(slow.clone()), vec![slow], None, 0)
        .unwrap();
    assert_eq!(h.controller.state(), PlayerState::Loading);
    assert!(h.controller.is_playing());

    assert!(h.pump_until(|c| c.state() == PlayerState::AwaitingData));
    assert!(h.controller.is_playing());

    assert!(h.pump_until(|c| c.state() == PlayerState::Playing));
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.session().duration(), Some(30.0));
}

#[test]
fn ended_track_advances_to_next() {
    let mut h = Harness::new();
    let queue = vec![track("first", "duration=0.1"), track("second", "duration=30")];
    h.controller
        .play(Some(queue[0].clone()), queue, None, 0)
        .unwrap();

    assert!(h.pump_until(|c| {
        c.current_track().is_some_and(|t| t.id == "second") && c.state() == PlayerState::Playing
    }));
}

#[test]
fn superseded_track_never_plays() {
    let mut h = Harness::new();
    let a = track("a", "duration=30&load_ms=80");
    let b = track("b", "duration=30");
    h.controller.play(Some(a.clone()), vec![a], None, 0).unwrap();
    h.controller.play(Some(b.clone()), vec![b], None, 0).unwrap();

    assert!(h.pump_until(|c| c.state() == PlayerState::Playing));
    assert_eq!(h.controller.current_track().unwrap().id, "b");

    // Give any late signals for the first track time to arrive
    thread::sleep(Duration::from_millis(150));
    h.sync.pump(&mut h.controller);
    assert_eq!(h.controller.current_track().unwrap().id, "b");
    assert_eq!(h.controller.engine().unwrap().source(), Some("sim://b?duration=30"));
    assert!(h.controller.is_playing());
}

#[test]
fn broken_media_reverts_to_paused() {
    let mut h = Harness::new();
    let broken = track("broken", "fail=1");
    h.controller
        .play(Some(broken.clone()), vec![broken], None, 0)
        .unwrap();

    assert!(h.pump_until(|c| !c.is_playing()));
    assert_eq!(h.controller.state(), PlayerState::Paused);
    assert!(h.controller.session().last_failure().is_some());
}

#[test]
fn toggle_after_broken_media_settles_paused() {
    let mut h = Harness::new();
    let broken = track("broken", "fail=1");
    h.controller
        .play(Some(broken.clone()), vec![broken], None, 0)
        .unwrap();
    assert!(h.pump_until(|c| !c.is_playing()));

    h.controller.toggle_play_pause();
    assert!(h.controller.is_playing());
    assert!(h.pump_until(|c| !c.is_playing()));
    assert_eq!(h.controller.state(), PlayerState::Paused);

    // Nothing late may flip it back
    thread::sleep(Duration::from_millis(100));
    h.sync.pump(&mut h.controller);
    assert!(!h.controller.is_playing());
    assert_eq!(h.controller.state(), PlayerState::Paused);
    assert!(h.controller.session().last_failure().is_some());
}

#[test]
fn seek_reads_back_engine_position() {
    let mut h = Harness::new();
    let song = track("song", "duration=200");
    h.controller
        .play(Some(song.clone()), vec![song], None, 0)
        .unwrap();
    assert!(h.pump_until(|c| c.state() == PlayerState::Playing));

    h.controller.seek(1000.0);
    assert!((h.controller.session().current_time() - 200.0).abs() < 1e-9);
}
