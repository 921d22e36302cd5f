use noteflow_core::action::{BoxedAction, CoopScheduler, ResourceSet};
use noteflow_core::coordinator::EdgeDetector;

use crate::coordinator::AttachmentCoordinator;

/// The assembled attachment: coordinator + scheduler + edge plumbing.
///
/// `tick()` is the single control cycle, driven by an external periodic
/// source (robot loop, tokio interval, test). Within one tick the possession
/// sensor is sampled once and any edge is dispatched **before** the scheduler
/// steps, so a transition observed this tick is visible to every action that
/// runs this tick.
pub struct AttachmentRig {
    coordinator: AttachmentCoordinator,
    scheduler: CoopScheduler,
    detector: EdgeDetector,
}

impl AttachmentRig {
    /// Seeds the edge detector from the current sensor reading so assembly
    /// never fabricates an edge.
    pub fn new(coordinator: AttachmentCoordinator) -> Self {
        let seeded = coordinator.possession();
        Self {
            coordinator,
            scheduler: CoopScheduler::new(),
            detector: EdgeDetector::new(seeded),
        }
    }

    pub fn coordinator(&self) -> &AttachmentCoordinator {
        &self.coordinator
    }

    /// Start an action; conflicting incumbents are cancelled first.
    pub fn schedule(&mut self, action: BoxedAction) {
        self.scheduler.schedule(action);
    }

    /// Cancel whatever currently holds one of `resources`.
    pub fn cancel_requiring(&mut self, resources: ResourceSet) {
        self.scheduler.cancel_requiring(resources);
    }

    /// Cancel everything (disable / end of match).
    pub fn cancel_all(&mut self) {
        self.scheduler.cancel_all();
    }

    /// One control cycle: sample, dispatch edge, step actions.
    pub fn tick(&mut self) {
        let sample = self.coordinator.possession();
        if let Some(edge) = self.detector.update(sample) {
            self.coordinator.handle_edge(&mut self.scheduler, edge);
        }
        self.scheduler.tick();
    }

    /// Number of active actions (introspection/tests).
    pub fn active_actions(&self) -> usize {
        self.scheduler.active_count()
    }
}
