// Copyright (c) 2026 Mathsieve Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::annotate::{Annotator, Outcome};
use crate::config::Config;
use crate::dom::Document;
use crate::scan::{parse_selector, Scanner};
use crate::schedule::{PassScope, Scheduler, Task, Trigger};
use crate::typeset::Typesetter;

/// Wires scanner, classifier, annotator and scheduler over one document.
///
/// The host owns the clock: it delivers `initial-load` and `route-change`
/// triggers and then drives due work with [`Pipeline::step`] or
/// [`Pipeline::run_until_idle`]. All state lives in the document tree itself
/// (marker attributes), so overlapping passes converge instead of
/// duplicating work.
pub struct Pipeline {
    config: Config,
    typesetter: Box<dyn Typesetter>,
    scheduler: Scheduler,
}

impl Pipeline {
    pub fn new(config: Config, typesetter: Box<dyn Typesetter>) -> Pipeline {
        Pipeline {
            config,
            typesetter,
            scheduler: Scheduler::new(),
        }
    }

    /// Install the insertion observation and schedule the first scan burst.
    /// With no observer target in the document this degrades to burst-only.
    pub fn on_initial_load(&mut self, doc: &mut Document) {
        if let Some(selector) = parse_selector(&self.config.scan.observer_root) {
            let target = doc
                .descendants(doc.root())
                .into_iter()
                .find(|id| selector.matches(doc, *id));
            match target {
                Some(target) => doc.observe(target),
                None => debug!("no observer target matches {:?}", self.config.scan.observer_root),
            }
        }
        self.scheduler
            .schedule(Trigger::InitialLoad, &self.config.schedule);
    }

    pub fn on_route_change(&mut self) {
        self.scheduler
            .schedule(Trigger::RouteChange, &self.config.schedule);
    }

    /// Run the next batch of due work: pick up recorded insertions, jump the
    /// virtual clock to the next deadline and execute everything due there.
    /// Returns false once nothing is pending.
    pub fn step(&mut self, doc: &mut Document) -> bool {
        if doc.has_pending_insertions() {
            let subtrees = doc.take_insertions();
            self.scheduler
                .schedule(Trigger::Mutation(subtrees), &self.config.schedule);
        }
        let Some(due) = self.scheduler.next_due() else {
            return false;
        };
        self.scheduler.advance_to(due);
        for task in self.scheduler.take_due() {
            self.run_task(doc, task);
        }
        true
    }

    pub fn run_until_idle(&mut self, doc: &mut Document) {
        while self.step(doc) {}
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    fn run_task(&mut self, doc: &mut Document, task: Task) {
        match task {
            Task::Pass(scope) => self.run_pass(doc, scope),
            Task::Replace(patch) => {
                if !doc.replace(patch.target, patch.replacement) {
                    // the rehydration race: the target went away first
                    trace!("substitution target already detached, dropping patch");
                }
            }
        }
    }

    fn run_pass(&mut self, doc: &mut Document, scope: PassScope) {
        let scanner = Scanner::new(&self.config.scan);
        let mut candidates = vec![];
        for root in scanner.roots(doc) {
            candidates.extend(scanner.scan_root(doc, root));
        }
        if let PassScope::Inserted(subtrees) = scope {
            for subtree in subtrees {
                if doc.is_attached(subtree) {
                    candidates.extend(scanner.scan_subtree(doc, subtree));
                }
            }
        }

        // an inserted subtree can also sit under a root scanned just now
        let mut seen = HashSet::new();
        candidates.retain(|candidate| seen.insert(candidate.node));

        let annotator = Annotator::new(&self.config, self.typesetter.as_ref());
        for candidate in &candidates {
            if let Outcome::Deferred(patch) = annotator.annotate(doc, candidate) {
                self.scheduler.push_after(0, Task::Replace(patch));
            }
        }
    }
}
