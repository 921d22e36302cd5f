use super::{BoxedAction, ResourceSet};

/// Single-threaded cooperative scheduler.
///
/// Responsibilities:
/// - Give every active action exactly one `step()` per tick, in schedule order
/// - Retire finished actions through `end(false)`
/// - Enforce exclusive actuator ownership: scheduling an action cancels every
///   incumbent whose requires-set conflicts, running the incumbent's cleanup
///   synchronously before the new action starts
///
/// There is no preemption; cancellation from a tick handler takes effect
/// before control returns to the caller, never deferred to the next tick.
#[derive(Default)]
pub struct CoopScheduler {
    running: Vec<BoxedAction>,
}

impl CoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel conflicting incumbents, then start and register `action`.
    pub fn schedule(&mut self, mut action: BoxedAction) {
        self.cancel_requiring(action.requires());
        action.start();
        self.running.push(action);
    }

    /// Cancel every running action whose requires-set overlaps `resources`.
    /// Each cancelled action's `end(true)` runs before this returns.
    pub fn cancel_requiring(&mut self, resources: ResourceSet) {
        if resources.is_empty() {
            return;
        }

        self.running.retain_mut(|action| {
            if action.requires().conflicts(resources) {
                action.end(true);
                false
            } else {
                true
            }
        });
    }

    /// Cancel everything (match end / disable).
    pub fn cancel_all(&mut self) {
        for mut action in self.running.drain(..) {
            action.end(true);
        }
    }

    /// One control cycle: step every action once, retire the finished ones.
    pub fn tick(&mut self) {
        self.running.retain_mut(|action| {
            action.step();
            if action.is_finished() {
                action.end(false);
                false
            } else {
                true
            }
        });
    }

    /// Number of actions currently active.
    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    /// True when some running action claims one of `resources`.
    pub fn is_held(&self, resources: ResourceSet) -> bool {
        self.running
            .iter()
            .any(|action| action.requires().conflicts(resources))
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{run_once, start_end, wait_ticks, Resource};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) + Clone) {
        let entries = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let entries = Rc::clone(&entries);
            move |entry| entries.borrow_mut().push(entry)
        };
        (entries, sink)
    }

    #[test]
    fn run_once_takes_effect_on_the_next_tick() {
        let (entries, sink) = log();
        let mut sched = CoopScheduler::new();

        sched.schedule(run_once(ResourceSet::EMPTY, move || sink("fired")));
        assert!(entries.borrow().is_empty());

        sched.tick();
        assert_eq!(entries.borrow().as_slice(), ["fired"]);
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn conflicting_schedule_cancels_incumbent_before_start() {
        let (entries, sink) = log();
        let s2 = sink.clone();
        let s3 = sink.clone();
        let mut sched = CoopScheduler::new();

        let shooter = ResourceSet::of(&[Resource::Shooter]);
        sched.schedule(start_end(
            shooter,
            move || sink("old-start"),
            move || s2("old-end"),
        ));
        sched.schedule(start_end(shooter, move || s3("new-start"), || {}));

        // Incumbent cleanup strictly before the replacement's start.
        assert_eq!(
            entries.borrow().as_slice(),
            ["old-start", "old-end", "new-start"]
        );
        assert_eq!(sched.active_count(), 1);
    }

    #[test]
    fn disjoint_actions_coexist() {
        let mut sched = CoopScheduler::new();

        sched.schedule(start_end(ResourceSet::of(&[Resource::Intake]), || {}, || {}));
        sched.schedule(start_end(ResourceSet::of(&[Resource::Pivot]), || {}, || {}));

        assert_eq!(sched.active_count(), 2);
        assert!(sched.is_held(ResourceSet::of(&[Resource::Intake])));
        assert!(!sched.is_held(ResourceSet::of(&[Resource::Feeder])));
    }

    #[test]
    fn cancel_requiring_runs_cleanup_synchronously() {
        let (entries, sink) = log();
        let mut sched = CoopScheduler::new();

        sched.schedule(start_end(
            ResourceSet::of(&[Resource::Feeder]),
            || {},
            move || sink("cleanup"),
        ));

        sched.cancel_requiring(ResourceSet::of(&[Resource::Feeder, Resource::Shooter]));
        assert_eq!(entries.borrow().as_slice(), ["cleanup"]);
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn empty_requires_is_never_cancelled_by_contention() {
        let mut sched = CoopScheduler::new();

        sched.schedule(wait_ticks(10));
        sched.schedule(start_end(ResourceSet::of(&[Resource::Intake]), || {}, || {}));

        assert_eq!(sched.active_count(), 2);
        sched.cancel_requiring(ResourceSet::of(&[Resource::Intake]));
        assert_eq!(sched.active_count(), 1);
    }

    #[test]
    fn finished_actions_retire_with_uncancelled_end() {
        let mut sched = CoopScheduler::new();

        sched.schedule(wait_ticks(2));
        sched.tick();
        assert_eq!(sched.active_count(), 1);
        sched.tick();
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn cancel_all_drains_everything() {
        let (entries, sink) = log();
        let s2 = sink.clone();
        let mut sched = CoopScheduler::new();

        sched.schedule(start_end(
            ResourceSet::of(&[Resource::Intake]),
            || {},
            move || sink("a"),
        ));
        sched.schedule(start_end(
            ResourceSet::of(&[Resource::Pivot]),
            || {},
            move || s2("b"),
        ));

        sched.cancel_all();
        assert_eq!(entries.borrow().as_slice(), ["a", "b"]);
        assert_eq!(sched.active_count(), 0);
    }
}
