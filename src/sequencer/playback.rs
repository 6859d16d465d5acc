/// Playback engine - the periodic clock that drives `tick`
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// One step period has passed; carries the time since the previous tick.
    Tick(Duration),
}

/// Step period for `bpm` with `subdivision` steps per beat.
pub fn tick_interval(bpm: f32, subdivision: usize) -> Duration {
    let steps_per_second = bpm / 60.0 * subdivision.max(1) as f32;
    Duration::from_secs_f32(1.0 / steps_per_second.max(f32::EPSILON))
}

/// A receiver whose sender is already gone; it never yields a tick.
fn idle_receiver() -> Receiver<PlaybackEvent> {
    let (_, receiver) = channel();
    receiver
}

pub struct PlaybackEngine {
    receiver: Receiver<PlaybackEvent>,
    is_running: Arc<AtomicBool>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self {
            receiver: idle_receiver(),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the clock thread. Does nothing if it is already running.
    pub fn start(&mut self, interval: Duration) {
        if self.is_running() {
            return;
        }
        // Each run owns its flag and channel; a stopped thread reaches neither.
        self.is_running = Arc::new(AtomicBool::new(true));
        let (sender, receiver) = channel();
        self.receiver = receiver;

        info!("Clock started, one tick every {:?}", interval);

        let is_running = Arc::clone(&self.is_running);

        thread::spawn(move || {
            let mut last_tick_time = Instant::now();

            while is_running.load(Ordering::SeqCst) {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick_time);

                if elapsed >= interval {
                    if sender.send(PlaybackEvent::Tick(elapsed)).is_err() {
                        break;
                    }
                    last_tick_time = now;
                }

                thread::sleep(Duration::from_millis(1));
            }

            debug!("Clock thread finished");
        });
    }

    pub fn stop(&mut self) {
        if self.is_running.swap(false, Ordering::SeqCst) {
            info!("Clock stopped");
        }
        self.receiver = idle_receiver();
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval() {
        // 120 bpm in 16th notes is 8 steps a second.
        let interval = tick_interval(120.0, 4);
        assert!((interval.as_secs_f32() - 0.125).abs() < 1e-6);

        let interval = tick_interval(60.0, 1);
        assert!((interval.as_secs_f32() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_engine_ticks_until_stopped() {
        let mut engine = PlaybackEngine::new();
        assert!(!engine.is_running());

        engine.start(Duration::from_millis(5));
        assert!(engine.is_running());
        thread::sleep(Duration::from_millis(100));

        let events = engine.poll_events();
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|PlaybackEvent::Tick(elapsed)| *elapsed >= Duration::from_millis(5)));

        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.poll_events().is_empty());
        thread::sleep(Duration::from_millis(30));
        assert!(engine.poll_events().is_empty());
    }

    #[test]
    fn test_restart_never_sees_ticks_from_previous_run() {
        let mut engine = PlaybackEngine::new();
        assert!(engine.poll_events().is_empty());

        engine.start(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(30));
        engine.stop();

        // Far longer than the test runs, so only a stale tick could show up.
        engine.start(Duration::from_secs(60));
        thread::sleep(Duration::from_millis(30));
        assert!(engine.poll_events().is_empty());
        engine.stop();
    }
}
