// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::annotate::Patch;
use crate::config;
use crate::dom::NodeId;

/// Why a pass is being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    InitialLoad,
    RouteChange,
    /// Subtrees freshly inserted under the observed root.
    Mutation(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub enum PassScope {
    /// The configured content-area roots.
    Roots,
    /// The roots plus freshly inserted subtrees (new content may appear
    /// either as new roots or inside already-scanned ones).
    Inserted(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub enum Task {
    Pass(PassScope),
    /// A block substitution deferred out of the pass that decided it.
    Replace(Patch),
}

struct Entry {
    due: u64,
    seq: u64,
    task: Task,
}

// Min-heap on (due, seq): earliest deadline first, insertion order within
// one deadline.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

/// Timer queue over a virtual millisecond clock. The host advances time;
/// nothing here blocks, cancels, or runs concurrently. A trigger arriving
/// while work is queued only adds entries, it never removes any.
pub struct Scheduler {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler {
            now: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, trigger: Trigger, config: &config::Schedule) {
        match trigger {
            // One pass would miss content the host is still inserting after
            // the nominal "loaded" signal; a bounded burst is the compromise.
            Trigger::InitialLoad | Trigger::RouteChange => {
                for delay in &config.burst_delays {
                    self.push_after(*delay, Task::Pass(PassScope::Roots));
                }
            }
            Trigger::Mutation(subtrees) => {
                self.push_after(config.mutation_delay, Task::Pass(PassScope::Inserted(subtrees)));
            }
        }
    }

    pub fn push_after(&mut self, delay: u64, task: Task) {
        let entry = Entry {
            due: self.now + delay,
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(entry);
    }

    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|entry| entry.due)
    }

    /// Jump the clock forward. Time never moves backwards.
    pub fn advance_to(&mut self, at: u64) {
        if at > self.now {
            self.now = at;
        }
    }

    /// Pop every task due at or before the current time, earliest first.
    pub fn take_due(&mut self) -> Vec<Task> {
        let mut due = vec![];
        while self.queue.peek().is_some_and(|entry| entry.due <= self.now) {
            due.push(self.queue.pop().unwrap().task);
        }
        due
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new()
    }
}
