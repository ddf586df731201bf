/*!
Simulation event callbacks.

The scene hands every step's notifications to one [`SimulationEventCallback`]
chosen when the scene is created. Two implementations ship with the crate:

- [`ContactReportCallback`] aggregates contact points and impulses for the
  current step and ignores everything else.
- [`NoopCallback`] discards everything.

`on_contact` is called concurrently from the dispatcher's workers during
`fetch_results`, one call per batch of pairs. The other notifications are
delivered from the stepping thread afterwards.
*/

use parking_lot::Mutex;

use crate::actor::{ActorHandle, ShapeHandle};
use crate::filter::{PairFlag, PairFlags};
use crate::math::Vec3;

/// One contact point of a reported pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPoint {
    /// World-space contact position.
    pub position: Vec3,
    /// Impulse applied at this point during the step, as received by the
    /// dynamic side of the pair (the second shape if both or neither are
    /// dynamic). Divide by the step length for a force.
    pub impulse: Vec3,
    /// Signed distance between the shapes at this point (negative when
    /// penetrating).
    pub separation: f32,
}

/// One shape pair's contact report for a step.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactPairReport {
    pub shapes: [ShapeHandle; 2],
    /// The touch event(s) this report is for: any of `NotifyTouchFound`,
    /// `NotifyTouchPersists`, `NotifyTouchLost`.
    pub events: PairFlags,
    /// Empty unless the pair's flags asked for contact points.
    pub points: Vec<ContactPoint>,
}

impl ContactPairReport {
    pub fn is_touch_found(&self) -> bool {
        self.events.contains(PairFlag::NotifyTouchFound)
    }

    pub fn is_touch_lost(&self) -> bool {
        self.events.contains(PairFlag::NotifyTouchLost)
    }
}

/// A trigger volume started or stopped overlapping another shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerReport {
    pub trigger: ShapeHandle,
    pub other: ShapeHandle,
    /// `NotifyTouchFound` or `NotifyTouchLost`.
    pub event: PairFlag,
}

/// Receiver of a scene's per-step notifications.
///
/// Implementations run on the backend's delivery path: they must not block
/// for long and must tolerate concurrent `on_contact` calls.
pub trait SimulationEventCallback: Send + Sync {
    /// Called once at the start of every step, before anything is simulated.
    fn on_step_begin(&self) {}

    fn on_contact(&self, pairs: &[ContactPairReport]);

    fn on_trigger(&self, _pairs: &[TriggerReport]) {}

    fn on_wake(&self, _actors: &[ActorHandle]) {}

    fn on_sleep(&self, _actors: &[ActorHandle]) {}
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCallback;

impl SimulationEventCallback for NoopCallback {
    fn on_contact(&self, _pairs: &[ContactPairReport]) {}
}

/// Where a [`ContactReportCallback`] is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    /// Empty, waiting for the backend to deliver.
    Idle,
    /// Holds points delivered during the current step.
    Accumulating,
}

/// The contact events of one step, split into parallel position and impulse lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactEvents {
    pub positions: Vec<Vec3>,
    pub impulses: Vec<Vec3>,
}

impl ContactEvents {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec3, &Vec3)> {
        self.positions.iter().zip(self.impulses.iter())
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.impulses.clear();
    }
}

/// Aggregates the contact points of the current step.
///
/// Points are appended in delivery order, which is backend-defined and not
/// geometrically meaningful. Nothing is deduplicated or merged, and the
/// colliding actors aren't recorded. The buffer is cleared when the next
/// step begins, so read it before stepping again.
#[derive(Debug, Default)]
pub struct ContactReportCallback {
    buffer: Mutex<ContactEvents>,
}

impl ContactReportCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SinkState {
        if self.buffer.lock().is_empty() {
            SinkState::Idle
        } else {
            SinkState::Accumulating
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current step's events.
    pub fn events(&self) -> ContactEvents {
        self.buffer.lock().clone()
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.buffer.lock().positions.clone()
    }

    pub fn impulses(&self) -> Vec<Vec3> {
        self.buffer.lock().impulses.clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl SimulationEventCallback for ContactReportCallback {
    fn on_step_begin(&self) {
        self.clear();
    }

    fn on_contact(&self, pairs: &[ContactPairReport]) {
        let mut buffer = self.buffer.lock();
        for pair in pairs.iter().filter(|p| !p.points.is_empty()) {
            for point in &pair.points {
                buffer.positions.push(point.position);
                buffer.impulses.push(point.impulse);
            }
        }
    }
}
