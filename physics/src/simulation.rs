/*!
Fixed-step simulation loop.

A step is split the way the backend's callers usually see it:

1. `simulate(dt)` clears the event callback's step state and advances the
   scene by exactly `dt` on the world's dispatcher. Start/stop transitions
   reported by the backend are queued, not delivered.
2. `fetch_results()` turns the finished step into contact, trigger, wake and
   sleep notifications and delivers them. Contact reports go out in batches
   from the dispatcher's workers, so the callback sees concurrent calls.
   It returns once every callback has returned.

[`World::step`] runs both back to back. There is no sub-stepping, no
interpolation and no cancellation: a step either completes or doesn't return.
*/

use std::collections::HashSet;

use parking_lot::Mutex;
use rapier3d::prelude::*;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::actor::{ActorHandle, ShapeHandle};
use crate::debug::DebugFrame;
use crate::error::{Result, WorldError};
use crate::events::{ContactPairReport, ContactPoint, TriggerReport};
use crate::filter::{FilterObjectType, FilterShape, PairFlag, PairFlags};
use crate::scene::Scene;
use crate::settings::CONTACT_REPORT_BATCH;
use crate::world::World;

/// What a completed step delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Index of the step (1 for the scene's first step).
    pub step: u64,
    /// Contact pair reports handed to the callback.
    pub contact_pairs: usize,
    /// Contact points across those reports.
    pub contact_points: usize,
    /// Trigger reports handed to the callback.
    pub triggers: usize,
}

/// Collects the backend's collision start/stop events during `simulate`.
///
/// The backend may call in from several threads, hence the lock.
#[derive(Default)]
pub(crate) struct StepEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl StepEventCollector {
    fn take(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.collisions.lock())
    }
}

impl EventHandler for StepEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// A simulated step whose results haven't been fetched yet.
pub(crate) struct PendingStep {
    step: u64,
    collisions: Vec<CollisionEvent>,
    awake_before: HashSet<RigidBodyHandle>,
}

/// Order-independent key for a collider pair.
fn pair_key(a: ColliderHandle, b: ColliderHandle) -> ((u32, u32), (u32, u32)) {
    let (a, b) = (a.into_raw_parts(), b.into_raw_parts());
    if a <= b { (a, b) } else { (b, a) }
}

impl Scene {
    pub(crate) fn simulate(&mut self, dt: f32, dispatcher: &ThreadPool) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(WorldError::SimulationPending(pending.step));
        }

        self.callback.on_step_begin();
        let awake_before = self.awake_actors();
        self.params.dt = dt;

        let hooks = self.hooks;
        dispatcher.install(|| {
            self.pipeline.step(
                &self.gravity,
                &self.params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &hooks,
                &self.collector,
            );
        });

        self.step_count += 1;
        self.pending = Some(PendingStep {
            step: self.step_count,
            collisions: self.collector.take(),
            awake_before,
        });
        Ok(())
    }

    pub(crate) fn fetch_results(&mut self, dispatcher: &ThreadPool) -> StepSummary {
        let Some(pending) = self.pending.take() else {
            return StepSummary {
                step: self.step_count,
                ..StepSummary::default()
            };
        };

        let (contacts, triggers) = self.build_reports(&pending);
        let summary = StepSummary {
            step: pending.step,
            contact_pairs: contacts.len(),
            contact_points: contacts.iter().map(|r| r.points.len()).sum(),
            triggers: triggers.len(),
        };

        let callback = &*self.callback;
        if !contacts.is_empty() {
            dispatcher.install(|| {
                contacts
                    .par_chunks(CONTACT_REPORT_BATCH)
                    .for_each(|batch| callback.on_contact(batch));
            });
        }
        if !triggers.is_empty() {
            callback.on_trigger(&triggers);
        }

        let awake_now = self.awake_actors();
        let woke: Vec<_> = awake_now
            .difference(&pending.awake_before)
            .map(|&h| ActorHandle(h))
            .collect();
        let slept: Vec<_> = pending
            .awake_before
            .difference(&awake_now)
            .filter(|h| self.actors.contains_key(*h))
            .map(|&h| ActorHandle(h))
            .collect();
        if !woke.is_empty() {
            callback.on_wake(&woke);
        }
        if !slept.is_empty() {
            callback.on_sleep(&slept);
        }

        if let Some(client) = &self.debug_client {
            client.send_frame(&DebugFrame {
                step: summary.step,
                actors: self.actors.len(),
                contact_pairs: summary.contact_pairs,
                contact_points: summary.contact_points,
            });
        }

        summary
    }

    /// Turn the backend state after a step into the reports the filter policy asks for.
    fn build_reports(&self, pending: &PendingStep) -> (Vec<ContactPairReport>, Vec<TriggerReport>) {
        let mut started = HashSet::new();
        let mut contacts = Vec::new();
        let mut triggers = Vec::new();

        for event in &pending.collisions {
            let (c1, c2) = (event.collider1(), event.collider2());
            if event.started() {
                started.insert(pair_key(c1, c2));
            }
            // A removed collider can't be shown to the policy any more.
            if event.removed() {
                continue;
            }
            let (Some(co1), Some(co2)) = (self.colliders.get(c1), self.colliders.get(c2)) else {
                continue;
            };
            let flags = (self.policy)(
                &FilterShape::of(co1, &self.bodies),
                &FilterShape::of(co2, &self.bodies),
            );
            let touch = if event.started() {
                PairFlag::NotifyTouchFound
            } else {
                PairFlag::NotifyTouchLost
            };
            if !flags.contains(touch) {
                continue;
            }

            if event.sensor() {
                let (trigger, other) = if co1.is_sensor() { (c1, c2) } else { (c2, c1) };
                triggers.push(TriggerReport {
                    trigger: ShapeHandle(trigger),
                    other: ShapeHandle(other),
                    event: touch,
                });
            } else if event.stopped() {
                contacts.push(ContactPairReport {
                    shapes: [ShapeHandle(c1), ShapeHandle(c2)],
                    events: PairFlags::from(PairFlag::NotifyTouchLost),
                    points: Vec::new(),
                });
            }
        }

        for pair in self.narrow_phase.contact_pairs() {
            let touching = pair
                .manifolds
                .iter()
                .any(|m| !m.data.solver_contacts.is_empty());
            if !touching {
                continue;
            }
            let (Some(co1), Some(co2)) = (
                self.colliders.get(pair.collider1),
                self.colliders.get(pair.collider2),
            ) else {
                continue;
            };
            // The backend keeps a sleeping pair's last manifolds untouched;
            // they describe an earlier step, not this one.
            if !self.drives_awake_body(co1) && !self.drives_awake_body(co2) {
                continue;
            }

            let s1 = FilterShape::of(co1, &self.bodies);
            let s2 = FilterShape::of(co2, &self.bodies);
            let flags = (self.policy)(&s1, &s2);
            let touch = if started.contains(&pair_key(pair.collider1, pair.collider2)) {
                PairFlag::NotifyTouchFound
            } else {
                PairFlag::NotifyTouchPersists
            };
            if !flags.contains(touch) {
                continue;
            }

            let points = if flags.contains(PairFlag::NotifyContactPoints) {
                extract_points(pair, co1, &s1, &s2)
            } else {
                Vec::new()
            };
            contacts.push(ContactPairReport {
                shapes: [ShapeHandle(pair.collider1), ShapeHandle(pair.collider2)],
                events: PairFlags::from(touch),
                points,
            });
        }

        (contacts, triggers)
    }

    /// The collider's parent is a dynamic body that is awake.
    fn drives_awake_body(&self, collider: &Collider) -> bool {
        collider
            .parent()
            .and_then(|h| self.bodies.get(h))
            .is_some_and(|b| b.is_dynamic() && !b.is_sleeping())
    }
}

/// World-space points and impulses of a touching pair, one per solver contact.
///
/// The backend's manifold normal points from the first collider towards the
/// second, so `normal * impulse` is what the second collider receives. Flip
/// it when only the first side is dynamic.
fn extract_points(
    pair: &ContactPair,
    co1: &Collider,
    s1: &FilterShape,
    s2: &FilterShape,
) -> Vec<ContactPoint> {
    let first_only_dynamic = s1.attributes.kind == FilterObjectType::Dynamic
        && s2.attributes.kind != FilterObjectType::Dynamic;
    let sign = if first_only_dynamic { -1.0 } else { 1.0 };

    let mut points = Vec::new();
    for manifold in pair.manifolds.iter().filter(|m| !m.data.solver_contacts.is_empty()) {
        let normal = manifold.data.normal;
        // Points beyond the prediction distance never reach the solver.
        let solved = manifold
            .data
            .solver_contacts
            .iter()
            .filter_map(|sc| manifold.points.get(sc.contact_id[0] as usize));
        for contact in solved {
            points.push(ContactPoint {
                position: co1.rotation() * contact.local_p1.coords + co1.translation(),
                impulse: normal * (contact.data.impulse * sign),
                separation: contact.dist,
            });
        }
    }
    points
}

impl World {
    /// Advance the active scene by exactly `dt` seconds without delivering
    /// any notifications yet. Pair with [`World::fetch_results`].
    pub fn simulate(&mut self, dt: f32) -> Result<()> {
        let scene = self.scene.as_mut().ok_or(WorldError::NoScene)?;
        scene.simulate(dt, &self.dispatcher)
    }

    /// Deliver the notifications of the last simulated step and wait for
    /// every callback to return. A no-op summary if nothing is pending.
    pub fn fetch_results(&mut self) -> Result<StepSummary> {
        let scene = self.scene.as_mut().ok_or(WorldError::NoScene)?;
        Ok(scene.fetch_results(&self.dispatcher))
    }

    /// One full fixed step: clear the step's events, simulate `dt`, deliver.
    ///
    /// Once this returns, the scene's contact report holds exactly this
    /// step's events.
    pub fn step(&mut self, dt: f32) -> Result<StepSummary> {
        self.simulate(dt)?;
        let summary = self.fetch_results()?;

        let aggregated = self
            .scene
            .as_ref()
            .and_then(|s| s.contact_report())
            .map(|report| report.len());
        match aggregated {
            Some(n) => log::debug!("step {}: {n} contact reports", summary.step),
            None => log::debug!(
                "step {}: {} contact points delivered",
                summary.step,
                summary.contact_points
            ),
        }
        Ok(summary)
    }
}
