use crate::graph::Position;
use std::time::Duration;
use tracing::trace;

/// One node's journey during an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub id: String,
    pub from: Position,
    pub to: Position,
}

/// Positions to render for one animation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub positions: Vec<(String, Position)>,
    /// Fraction of the duration elapsed, clamped to `[0, 1]`.
    pub progress: f64,
    /// The last frame: every position equals its `to` exactly.
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct Running {
    transitions: Vec<Transition>,
    started_at: Duration,
    duration: Duration,
}

/// A cancellable, time-driven linear interpolation.
///
/// Time is supplied by the caller as a `Duration` since some fixed epoch, so
/// the handle never reads a clock itself. At most one animation runs at a
/// time: starting a new one drops the previous one.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    running: Option<Running>,
}

impl AnimationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, transitions: Vec<Transition>, duration: Duration, now: Duration) {
        if self.cancel() {
            trace!("Replaced in-flight animation");
        }
        self.running = Some(Running {
            transitions,
            started_at: now,
            duration,
        });
    }

    /// Stop the running animation, if any. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.running.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    /// Produce the frame for `now`; `None` while idle.
    ///
    /// Once the duration has elapsed the frame snaps to the targets and the
    /// handle goes idle.
    pub fn tick(&mut self, now: Duration) -> Option<AnimationFrame> {
        let running = self.running.as_ref()?;
        let elapsed = now.saturating_sub(running.started_at);

        if elapsed >= running.duration {
            let positions = running
                .transitions
                .iter()
                .map(|t| (t.id.clone(), t.to))
                .collect();
            self.running = None;
            return Some(AnimationFrame {
                positions,
                progress: 1.0,
                finished: true,
            });
        }

        let progress = elapsed.as_secs_f64() / running.duration.as_secs_f64();
        trace!(progress, "Animation tick");
        let positions = running
            .transitions
            .iter()
            .map(|t| (t.id.clone(), t.from.lerp(t.to, progress)))
            .collect();
        Some(AnimationFrame {
            positions,
            progress,
            finished: false,
        })
    }
}
