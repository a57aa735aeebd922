use crate::engine::presentation::state::{PresentationState, Trigger};
use bevy::prelude::*;
use std::time::Duration;

/// One-shot transition armed while the machine was in `from`.
#[derive(Debug, Clone)]
struct ScheduledTransition {
    from: PresentationState,
    trigger: Trigger,
    timer: Timer,
}

/// Pending timed transitions.
///
/// An entry only fires into the state that scheduled it; the caller drops
/// entries whose state is no longer current.
#[derive(Debug, Clone, Default)]
pub struct ScheduledTransitions {
    entries: Vec<ScheduledTransition>,
}

impl ScheduledTransitions {
    pub fn schedule(&mut self, from: PresentationState, trigger: Trigger, delay: Duration) {
        self.entries.push(ScheduledTransition {
            from,
            trigger,
            timer: Timer::new(delay, TimerMode::Once),
        });
    }

    /// Advance every timer by `delta` and remove the due entries, in the
    /// order they were scheduled.
    pub fn tick(&mut self, delta: Duration) -> Vec<(PresentationState, Trigger)> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.timer.tick(delta);
            if entry.timer.finished() {
                due.push((entry.from, entry.trigger));
                false
            } else {
                true
            }
        });
        due
    }

    /// Drop every pending entry. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
