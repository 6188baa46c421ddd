// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The priority of a deferred task. Higher priorities run first within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdatePriority(pub i32);

impl UpdatePriority {
    /// Work that must land before the next interaction is processed.
    pub const INTERACTIVE: Self = Self(50);
    /// Work that should precede regular updates.
    pub const HIGH: Self = Self(25);
    /// The default priority.
    pub const NORMAL: Self = Self(0);
    /// Work that should follow regular updates.
    pub const LOW: Self = Self(-25);
    /// Background housekeeping.
    pub const UTILITY: Self = Self(-50);

    /// Returns a priority `steps` below this one.
    pub const fn below(self, steps: i32) -> Self {
        Self(self.0 - steps)
    }
}

impl Default for UpdatePriority {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A one-shot task run against the ticker owner's context.
pub type Task<C> = Box<dyn FnOnce(&mut C) + Send>;

struct Scheduled<C> {
    priority: UpdatePriority,
    seq: u64,
    task: Task<C>,
}

/// A priority-keyed queue of one-shot tasks run at the next frame boundary.
///
/// The owner calls [`Ticker::take_due`] once per tick and runs the returned
/// tasks in order. Because the queue is taken before anything runs, each task
/// fires exactly once, and tasks scheduled while the batch runs wait for the
/// following tick.
pub struct Ticker<C> {
    queue: Vec<Scheduled<C>>,
    seq: u64,
    ticks: u64,
}

impl<C> Ticker<C> {
    /// Creates an empty ticker.
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            seq: 0,
            ticks: 0,
        }
    }

    /// Queues `task` to run once on the next tick.
    pub fn schedule_once(
        &mut self,
        priority: UpdatePriority,
        task: impl FnOnce(&mut C) + Send + 'static,
    ) {
        self.queue.push(Scheduled {
            priority,
            seq: self.seq,
            task: Box::new(task),
        });
        self.seq += 1;
        log::trace!("Scheduled one-shot task at priority {}", priority.0);
    }

    /// Removes and returns every queued task, highest priority first and in
    /// scheduling order within a priority.
    pub fn take_due(&mut self) -> Vec<Task<C>> {
        self.ticks += 1;
        let mut due = std::mem::take(&mut self.queue);
        due.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.task).collect()
    }

    /// Returns the number of tasks waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns how many ticks have been taken.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drops every queued task without running it.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<C> Default for Ticker<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Ticker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("pending", &self.queue.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        ticker: Ticker<Ctx>,
        ran: Vec<&'static str>,
    }

    impl Ctx {
        fn tick(&mut self) {
            for task in self.ticker.take_due() {
                task(self);
            }
        }
    }

    #[test]
    fn tasks_run_by_priority_then_fifo() {
        let mut ctx = Ctx {
            ticker: Ticker::new(),
            ran: Vec::new(),
        };
        ctx.ticker.schedule_once(UpdatePriority::LOW, |c| c.ran.push("low"));
        ctx.ticker.schedule_once(UpdatePriority::HIGH, |c| c.ran.push("high-1"));
        ctx.ticker.schedule_once(UpdatePriority::HIGH, |c| c.ran.push("high-2"));
        ctx.ticker
            .schedule_once(UpdatePriority::LOW.below(1), |c| c.ran.push("below-low"));

        ctx.tick();
        assert_eq!(ctx.ran, vec!["high-1", "high-2", "low", "below-low"]);
    }

    #[test]
    fn tasks_fire_exactly_once() {
        let mut ctx = Ctx {
            ticker: Ticker::new(),
            ran: Vec::new(),
        };
        ctx.ticker.schedule_once(UpdatePriority::NORMAL, |c| c.ran.push("once"));
        ctx.tick();
        ctx.tick();
        assert_eq!(ctx.ran, vec!["once"]);
        assert_eq!(ctx.ticker.ticks(), 2);
    }

    #[test]
    fn tasks_scheduled_while_draining_wait_a_tick() {
        let mut ctx = Ctx {
            ticker: Ticker::new(),
            ran: Vec::new(),
        };
        ctx.ticker.schedule_once(UpdatePriority::NORMAL, |c| {
            c.ran.push("outer");
            c.ticker
                .schedule_once(UpdatePriority::INTERACTIVE, |c| c.ran.push("inner"));
        });

        ctx.tick();
        assert_eq!(ctx.ran, vec!["outer"]);
        assert_eq!(ctx.ticker.pending(), 1);

        ctx.tick();
        assert_eq!(ctx.ran, vec!["outer", "inner"]);
    }

    #[test]
    fn priority_ordering_constants() {
        assert!(UpdatePriority::INTERACTIVE > UpdatePriority::HIGH);
        assert!(UpdatePriority::LOW > UpdatePriority::LOW.below(1));
        assert_eq!(UpdatePriority::default(), UpdatePriority::NORMAL);
    }
}
