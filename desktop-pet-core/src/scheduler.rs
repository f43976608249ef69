//! Virtual-clock timer queue.
//!
//! The host owns real time; it tells the scheduler how much time has passed
//! and the scheduler hands back the timers that came due, in due order (ties
//! in creation order). Each timer names its [`TimerTarget`] so the pet can
//! check the target still exists before acting on it.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::bubble::BubbleId;
use crate::wander::DragToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerId(pub u64);

/// What a timer fires for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTarget {
    Wander,
    AutoSpeech,
    BubbleFollow(BubbleId),
    BubbleExpire(BubbleId),
    DragRelease(DragToken),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    target: TimerTarget,
    period: Option<Duration>,
    due: Duration,
}

/// A fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub target: TimerTarget,
    /// When the timer was due; the scheduler clock reads this while the
    /// timer's callback runs.
    pub due: Duration,
}

/// Timer queue on a clock that only moves forward.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), TimerId>,
    timers: HashMap<TimerId, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `target` once, `delay` from now.
    pub fn once(&mut self, delay: Duration, target: TimerTarget) -> TimerId {
        self.insert(delay, None, target)
    }

    /// Fire `target` every `period`, first one `period` from now.
    ///
    /// A zero period is treated as one millisecond so a periodic timer can
    /// never spin.
    pub fn every(&mut self, period: Duration, target: TimerTarget) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(period, Some(period), target)
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, target: TimerTarget) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let due = self.now + delay;
        self.queue.insert((due, id.0), id);
        self.timers.insert(id, Timer { target, period, due });
        id
    }

    /// Cancel a timer. Returns false if it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.remove(&id) {
            Some(timer) => {
                self.queue.remove(&(timer.due, id.0));
                true
            }
            None => false,
        }
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// When the earliest pending timer is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Periodic timers are re-armed; one that fell more than a
    /// period behind skips the missed ticks instead of firing them in a burst.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired> {
        let (&(due, seq), &id) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        self.queue.remove(&(due, seq));
        self.now = self.now.max(due);

        let timer = *self.timers.get(&id)?;
        match timer.period {
            Some(period) => {
                let mut next = due + period;
                if next < until {
                    next = until + period;
                }
                self.queue.insert((next, seq), id);
                if let Some(slot) = self.timers.get_mut(&id) {
                    slot.due = next;
                }
            }
            None => {
                self.timers.remove(&id);
            }
        }

        Some(Fired {
            id,
            target: timer.target,
            due,
        })
    }

    /// Move the clock to `until` once every due timer has been popped.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
