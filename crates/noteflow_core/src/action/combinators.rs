//! Action composition primitives.
//!
//! Leaves (`run_once`, `start_end`, `wait_ticks`, `wait_until`) and groups
//! (`sequence`, `parallel_all`, `race`, `finally`). Groups derive their
//! requires-set as the union of their children, so arbitration always sees the
//! full claim of a composed action.
//!
//! Tick semantics: `start()` only arms; `step()` does the work. A `run_once`
//! reached by a sequence at tick N performs its write at tick N+1. The one
//! deliberate exception is `start_end`, whose start closure runs at `start()`
//! so operator-held actions take effect the moment they are scheduled.

use super::{Action, BoxedAction, ResourceSet};

// ---------------- Leaves ----------------

/// Runs a closure once (on its first step), then is finished.
pub struct RunOnce<F: FnMut()> {
    body: F,
    requires: ResourceSet,
    done: bool,
}

/// One-shot action over `body`, claiming `requires`.
pub fn run_once<F: FnMut() + 'static>(requires: ResourceSet, body: F) -> BoxedAction {
    Box::new(RunOnce {
        body,
        requires,
        done: false,
    })
}

impl<F: FnMut()> Action for RunOnce<F> {
    fn start(&mut self) {
        self.done = false;
    }

    fn step(&mut self) {
        if !self.done {
            (self.body)();
            self.done = true;
        }
    }

    fn is_finished(&self) -> bool {
        self.done
    }

    fn end(&mut self, _was_cancelled: bool) {}

    fn requires(&self) -> ResourceSet {
        self.requires
    }
}

/// Runs a start closure when scheduled and an end closure when it terminates;
/// never finishes on its own. The canonical operator-held action.
pub struct StartEnd<S: FnMut(), E: FnMut()> {
    on_start: S,
    on_end: E,
    requires: ResourceSet,
}

/// Run-while-active action: `on_start` at schedule time, `on_end` on any
/// termination (cancellation included).
pub fn start_end<S, E>(requires: ResourceSet, on_start: S, on_end: E) -> BoxedAction
where
    S: FnMut() + 'static,
    E: FnMut() + 'static,
{
    Box::new(StartEnd {
        on_start,
        on_end,
        requires,
    })
}

impl<S: FnMut(), E: FnMut()> Action for StartEnd<S, E> {
    fn start(&mut self) {
        (self.on_start)();
    }

    fn step(&mut self) {}

    fn is_finished(&self) -> bool {
        false
    }

    fn end(&mut self, _was_cancelled: bool) {
        (self.on_end)();
    }

    fn requires(&self) -> ResourceSet {
        self.requires
    }
}

/// Finishes after a fixed number of scheduler ticks.
pub struct WaitTicks {
    ticks: u32,
    remaining: u32,
}

/// Fixed-duration wait, measured in scheduler ticks. Wall-clock tuning is
/// converted once by the caller's timing config.
pub fn wait_ticks(ticks: u32) -> BoxedAction {
    Box::new(WaitTicks {
        ticks,
        remaining: ticks,
    })
}

impl Action for WaitTicks {
    fn start(&mut self) {
        self.remaining = self.ticks;
    }

    fn step(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    fn end(&mut self, _was_cancelled: bool) {}

    fn requires(&self) -> ResourceSet {
        ResourceSet::EMPTY
    }
}

/// Finishes on the first tick the predicate reports true.
pub struct WaitUntil<P: FnMut() -> bool> {
    predicate: P,
    satisfied: bool,
}

/// Suspend until `predicate` holds; evaluated once per tick.
pub fn wait_until<P: FnMut() -> bool + 'static>(predicate: P) -> BoxedAction {
    Box::new(WaitUntil {
        predicate,
        satisfied: false,
    })
}

impl<P: FnMut() -> bool> Action for WaitUntil<P> {
    fn start(&mut self) {
        self.satisfied = false;
    }

    fn step(&mut self) {
        if !self.satisfied {
            self.satisfied = (self.predicate)();
        }
    }

    fn is_finished(&self) -> bool {
        self.satisfied
    }

    fn end(&mut self, _was_cancelled: bool) {}

    fn requires(&self) -> ResourceSet {
        ResourceSet::EMPTY
    }
}

// ---------------- Groups ----------------

fn union_of(children: &[BoxedAction]) -> ResourceSet {
    children
        .iter()
        .fold(ResourceSet::EMPTY, |acc, child| acc.union(child.requires()))
}

/// Runs children one after another. A child that finishes at tick N hands the
/// next child its first step at tick N+1.
pub struct Sequence {
    children: Vec<BoxedAction>,
    index: usize,
    requires: ResourceSet,
}

/// Sequential staging of `children`.
pub fn sequence(children: Vec<BoxedAction>) -> BoxedAction {
    let requires = union_of(&children);
    Box::new(Sequence {
        children,
        index: 0,
        requires,
    })
}

impl Action for Sequence {
    fn start(&mut self) {
        self.index = 0;
        if let Some(first) = self.children.first_mut() {
            first.start();
        }
    }

    fn step(&mut self) {
        let Some(child) = self.children.get_mut(self.index) else {
            return;
        };

        child.step();
        if child.is_finished() {
            child.end(false);
            self.index += 1;
            if let Some(next) = self.children.get_mut(self.index) {
                next.start();
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.index >= self.children.len()
    }

    fn end(&mut self, was_cancelled: bool) {
        // Only the in-flight child still needs its cleanup; completed children
        // already ended naturally.
        if was_cancelled {
            if let Some(child) = self.children.get_mut(self.index) {
                child.end(true);
            }
        }
    }

    fn requires(&self) -> ResourceSet {
        self.requires
    }
}

/// Steps all children every tick; finished once every child has finished.
pub struct ParallelAll {
    children: Vec<(BoxedAction, bool)>,
    requires: ResourceSet,
}

/// Parallel wait-for-all composition.
pub fn parallel_all(children: Vec<BoxedAction>) -> BoxedAction {
    let requires = union_of(&children);
    let children = children.into_iter().map(|c| (c, false)).collect();
    Box::new(ParallelAll { children, requires })
}

impl Action for ParallelAll {
    fn start(&mut self) {
        for (child, done) in &mut self.children {
            *done = false;
            child.start();
        }
    }

    fn step(&mut self) {
        for (child, done) in &mut self.children {
            if *done {
                continue;
            }
            child.step();
            if child.is_finished() {
                child.end(false);
                *done = true;
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.children.iter().all(|(_, done)| *done)
    }

    fn end(&mut self, was_cancelled: bool) {
        if was_cancelled {
            for (child, done) in &mut self.children {
                if !*done {
                    child.end(true);
                }
            }
        }
    }

    fn requires(&self) -> ResourceSet {
        self.requires
    }
}

/// Steps all children every tick; the first to finish wins and the rest are
/// cancelled on the spot.
pub struct Race {
    children: Vec<BoxedAction>,
    settled: bool,
    requires: ResourceSet,
}

/// Race-first-to-finish composition.
pub fn race(children: Vec<BoxedAction>) -> BoxedAction {
    let requires = union_of(&children);
    Box::new(Race {
        children,
        settled: false,
        requires,
    })
}

impl Action for Race {
    fn start(&mut self) {
        self.settled = false;
        for child in &mut self.children {
            child.start();
        }
    }

    fn step(&mut self) {
        if self.settled {
            return;
        }

        for child in &mut self.children {
            child.step();
        }

        let winner = self
            .children
            .iter()
            .position(|child| child.is_finished());

        if let Some(winner) = winner {
            for (i, child) in self.children.iter_mut().enumerate() {
                child.end(i != winner);
            }
            self.settled = true;
        }
    }

    fn is_finished(&self) -> bool {
        self.settled
    }

    fn end(&mut self, was_cancelled: bool) {
        // Once settled every child has already ended.
        if was_cancelled && !self.settled {
            for child in &mut self.children {
                child.end(true);
            }
        }
    }

    fn requires(&self) -> ResourceSet {
        self.requires
    }
}

/// Wraps an action with a cleanup closure that runs on every termination path.
pub struct Finally<F: FnMut()> {
    inner: BoxedAction,
    cleanup: F,
}

/// Attach a termination cleanup to `inner`. The cleanup runs whether the
/// action finishes, times out, or is cancelled.
pub fn finally<F: FnMut() + 'static>(inner: BoxedAction, cleanup: F) -> BoxedAction {
    Box::new(Finally { inner, cleanup })
}

impl<F: FnMut()> Action for Finally<F> {
    fn start(&mut self) {
        self.inner.start();
    }

    fn step(&mut self) {
        self.inner.step();
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn end(&mut self, was_cancelled: bool) {
        self.inner.end(was_cancelled);
        (self.cleanup)();
    }

    fn requires(&self) -> ResourceSet {
        self.inner.requires()
    }
}

//
// Tests
//
