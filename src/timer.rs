use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::config::TimerConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    Tick {
        #[serde(rename = "remainingSeconds")]
        remaining_secs: u32,
    },
    Warning {
        #[serde(rename = "remainingSeconds")]
        remaining_secs: u32,
    },
    Completed,
}

/// One-second countdown, independent of the board.
///
/// Stopping (explicitly or by running out) is terminal until `reset`.
#[derive(Debug, Clone)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    state: TimerState,
    warning_secs: u32,
    almost_done_secs: u32,
    warned: bool,
    finished: bool,
}

impl Countdown {
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            duration: config.duration_secs,
            remaining: config.duration_secs,
            state: TimerState::Stopped,
            warning_secs: config.warning_secs,
            almost_done_secs: config.almost_done_secs,
            warned: false,
            finished: false,
        }
    }

    pub fn with_duration(duration_secs: u32) -> Self {
        Self::new(&TimerConfig {
            duration_secs,
            ..TimerConfig::default()
        })
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start(&mut self) {
        if self.finished || self.state != TimerState::Stopped {
            return;
        }
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
        self.finished = true;
    }

    /// Stop and rewind, optionally changing the allotment.
    pub fn reset(&mut self, new_duration: Option<u32>) {
        if let Some(duration) = new_duration {
            self.duration = duration;
        }
        self.remaining = self.duration;
        self.state = TimerState::Stopped;
        self.warned = false;
        self.finished = false;
    }

    /// Advance one second. Ignored unless running.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if self.state != TimerState::Running {
            return Vec::new();
        }

        let before = self.remaining;
        self.remaining = self.remaining.saturating_sub(1);

        let mut events = vec![TimerEvent::Tick {
            remaining_secs: self.remaining,
        }];
        self.settle(before, &mut events);
        events
    }

    /// Extra time, never beyond the full allotment.
    pub fn add_time(&mut self, secs: u32) {
        if self.finished {
            return;
        }
        self.remaining = self.remaining.saturating_add(secs).min(self.duration);
    }

    /// Penalty time. Hitting zero completes the countdown immediately.
    pub fn subtract_time(&mut self, secs: u32) -> Vec<TimerEvent> {
        if self.finished {
            return Vec::new();
        }

        let before = self.remaining;
        self.remaining = self.remaining.saturating_sub(secs);

        let mut events = Vec::new();
        self.settle(before, &mut events);
        events
    }

    fn settle(&mut self, before: u32, events: &mut Vec<TimerEvent>) {
        if !self.warned && before > self.warning_secs && self.remaining <= self.warning_secs {
            self.warned = true;
            info!(remaining = self.remaining, "time running low");
            events.push(TimerEvent::Warning {
                remaining_secs: self.remaining,
            });
        }

        if self.remaining == 0 && !self.finished {
            self.stop();
            info!("countdown complete");
            events.push(TimerEvent::Completed);
        }
    }

    /// `MM:SS`.
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }

    pub fn percentage_remaining(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        self.remaining as f64 / self.duration as f64 * 100.0
    }

    pub fn is_running_low(&self) -> bool {
        self.remaining <= self.warning_secs
    }

    pub fn is_almost_done(&self) -> bool {
        self.remaining <= self.almost_done_secs
    }
}

/// Tick a shared countdown every `period` and forward its events until it
/// stops. The first tick fires one period after spawning. A countdown that
/// was never started ends the task on that first tick, and so does dropping
/// the receiver.
pub fn spawn_countdown(
    timer: Arc<Mutex<Countdown>>,
    period: Duration,
    tx: UnboundedSender<TimerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            let (events, state) = {
                let mut timer = timer.lock().await;
                let events = timer.tick();
                (events, timer.state())
            };

            for event in events {
                if tx.send(event).is_err() {
                    debug!("countdown receiver dropped");
                    return;
                }
            }
            if state == TimerState::Stopped {
                break;
            }
        }
    })
}
