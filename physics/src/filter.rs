/*!
Contact filtering.

A filter policy is a plain `fn` that looks at two shapes and returns the
[`PairFlags`] for the pair: whether contacts are generated and solved, and
which contact events are reported with how much detail. Being a `fn` pointer
it can't capture state, so the backend is free to call it from any worker.

The policy is consulted in two places:
- [`PolicyHooks`] runs it inside the backend's narrow phase to decide whether
  a pair generates and solves contacts.
- The scene runs it again when building the step's contact reports, to decide
  what gets reported. The policy is pure, so both calls agree.
*/

use rapier3d::prelude::*;

use crate::flags::FlagSet;

crate::define_flags!(
    /// What the backend does with a colliding pair.
    PairFlag, u16, {
        /// Contacts are fed to the solver.
        SolveContact,
        /// Contacts are generated at discrete (per-step) granularity.
        DetectDiscreteContact,
        /// Report the step in which the pair starts touching.
        NotifyTouchFound,
        /// Report every later step in which the pair is still touching.
        NotifyTouchPersists,
        /// Report the step in which the pair stops touching.
        NotifyTouchLost,
        /// Attach per-point position and impulse to contact reports.
        NotifyContactPoints,
    }
);

pub type PairFlags = FlagSet<PairFlag>;

/// The events a pair can report; everything but these in [`PairFlags`] is
/// about simulation, not reporting.
pub fn touch_events() -> PairFlags {
    PairFlags::of(&[
        PairFlag::NotifyTouchFound,
        PairFlag::NotifyTouchPersists,
        PairFlag::NotifyTouchLost,
    ])
}

/// Classification of the body a shape belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterObjectType {
    Static,
    Dynamic,
    Kinematic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterObjectAttributes {
    pub kind: FilterObjectType,
    /// The shape is a trigger volume (backend sensor).
    pub trigger: bool,
}

/// Four application-defined words attached to a shape.
///
/// Opaque to this crate; policies interpret them. Stored in the collider's
/// 128-bit user data.
///
/// # Bit layout
/// Word `i` occupies bits `32 * i .. 32 * i + 32` of the user data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterData {
    pub words: [u32; 4],
}

impl FilterData {
    pub fn new(word0: u32, word1: u32, word2: u32, word3: u32) -> Self {
        Self {
            words: [word0, word1, word2, word3],
        }
    }

    pub fn pack(&self) -> u128 {
        self.words
            .iter()
            .enumerate()
            .fold(0u128, |acc, (i, &w)| acc | ((w as u128) << (32 * i)))
    }

    pub fn unpack(bits: u128) -> Self {
        const WORD_MASK: u128 = u32::MAX as u128;
        let word = |i: usize| ((bits >> (32 * i)) & WORD_MASK) as u32;
        Self::new(word(0), word(1), word(2), word(3))
    }
}

/// Everything a policy gets to see about one side of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterShape {
    pub attributes: FilterObjectAttributes,
    pub data: FilterData,
}

impl FilterShape {
    /// Read the filter inputs of a backend collider.
    ///
    /// A collider without a parent body counts as static.
    pub fn of(collider: &Collider, bodies: &RigidBodySet) -> Self {
        let kind = match collider.parent().and_then(|h| bodies.get(h)) {
            Some(body) if body.is_dynamic() => FilterObjectType::Dynamic,
            Some(body) if body.is_kinematic() => FilterObjectType::Kinematic,
            _ => FilterObjectType::Static,
        };
        Self {
            attributes: FilterObjectAttributes {
                kind,
                trigger: collider.is_sensor(),
            },
            data: FilterData::unpack(collider.user_data),
        }
    }
}

/// Decides the [`PairFlags`] of a candidate pair. Must not block or panic.
pub type FilterPolicy = fn(&FilterShape, &FilterShape) -> PairFlags;

/// Report everything: every pair is solved and reports touch found and touch
/// persists with per-point detail.
pub fn report_all_contacts(_: &FilterShape, _: &FilterShape) -> PairFlags {
    const ALL: [PairFlag; 5] = [
        PairFlag::SolveContact,
        PairFlag::DetectDiscreteContact,
        PairFlag::NotifyTouchFound,
        PairFlag::NotifyTouchPersists,
        PairFlag::NotifyContactPoints,
    ];
    PairFlags::of(&ALL)
}

/// Quiet policy: solid pairs are solved without notifications, and pairs
/// involving a trigger report only when they start and stop overlapping.
pub fn default_simulation_policy(a: &FilterShape, b: &FilterShape) -> PairFlags {
    if a.attributes.trigger || b.attributes.trigger {
        return PairFlags::of(&[PairFlag::NotifyTouchFound, PairFlag::NotifyTouchLost]);
    }
    PairFlags::of(&[PairFlag::SolveContact, PairFlag::DetectDiscreteContact])
}

/// Adapter running a [`FilterPolicy`] inside the backend's narrow phase.
///
/// Only colliders built with [`ActiveHooks::FILTER_CONTACT_PAIRS`] and
/// [`ActiveHooks::FILTER_INTERSECTION_PAIR`] reach it, which is every collider
/// this crate creates.
#[derive(Clone, Copy)]
pub(crate) struct PolicyHooks {
    pub policy: FilterPolicy,
}

impl PolicyHooks {
    fn flags(&self, context: &PairFilterContext) -> PairFlags {
        let a = FilterShape::of(&context.colliders[context.collider1], context.bodies);
        let b = FilterShape::of(&context.colliders[context.collider2], context.bodies);
        (self.policy)(&a, &b)
    }
}

impl PhysicsHooks for PolicyHooks {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let flags = self.flags(context);
        if !flags.contains(PairFlag::DetectDiscreteContact) {
            // No contacts at all for this pair.
            return None;
        }
        if flags.contains(PairFlag::SolveContact) {
            Some(SolverFlags::COMPUTE_IMPULSES)
        } else {
            Some(SolverFlags::empty())
        }
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext) -> bool {
        // Trigger overlaps are only worth tracking if somebody wants to hear about them.
        self.flags(context).intersects(touch_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: FilterObjectType, trigger: bool) -> FilterShape {
        FilterShape {
            attributes: FilterObjectAttributes { kind, trigger },
            data: FilterData::default(),
        }
    }

    #[test]
    fn report_all_contacts_sets_full_detail_for_any_pair() {
        let kinds = [
            FilterObjectType::Static,
            FilterObjectType::Dynamic,
            FilterObjectType::Kinematic,
        ];
        for &a in &kinds {
            for &b in &kinds {
                let flags = report_all_contacts(&shape(a, false), &shape(b, true));
                assert!(flags.contains(PairFlag::SolveContact));
                assert!(flags.contains(PairFlag::DetectDiscreteContact));
                assert!(flags.contains(PairFlag::NotifyTouchFound));
                assert!(flags.contains(PairFlag::NotifyTouchPersists));
                assert!(flags.contains(PairFlag::NotifyContactPoints));
                assert!(!flags.contains(PairFlag::NotifyTouchLost));
            }
        }
    }

    #[test]
    fn default_simulation_policy_only_notifies_for_triggers() {
        let solid = default_simulation_policy(
            &shape(FilterObjectType::Dynamic, false),
            &shape(FilterObjectType::Static, false),
        );
        assert!(solid.contains(PairFlag::SolveContact));
        assert!(!solid.intersects(touch_events()));

        let trigger = default_simulation_policy(
            &shape(FilterObjectType::Static, true),
            &shape(FilterObjectType::Dynamic, false),
        );
        assert!(trigger.contains(PairFlag::NotifyTouchFound));
        assert!(trigger.contains(PairFlag::NotifyTouchLost));
        assert!(!trigger.contains(PairFlag::SolveContact));
    }

    #[test]
    fn filter_data_words_occupy_their_own_32_bits() {
        let data = FilterData::new(1, 0xDEAD_BEEF, 0, u32::MAX);
        let bits = data.pack();

        assert_eq!(bits & 0xFFFF_FFFF, 1);
        assert_eq!((bits >> 32) & 0xFFFF_FFFF, 0xDEAD_BEEF);
        assert_eq!(bits >> 96, u32::MAX as u128);
        assert_eq!(FilterData::unpack(bits), data);
    }

    #[test]
    fn filter_shape_reads_body_type_sensor_flag_and_user_data() {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let body = bodies.insert(RigidBodyBuilder::dynamic().build());
        let sensor = colliders.insert_with_parent(
            ColliderBuilder::ball(1.0)
                .sensor(true)
                .user_data(FilterData::new(7, 0, 0, 0).pack())
                .build(),
            body,
            &mut bodies,
        );
        let loose = colliders.insert(ColliderBuilder::ball(1.0).build());

        let s = FilterShape::of(&colliders[sensor], &bodies);
        assert_eq!(s.attributes.kind, FilterObjectType::Dynamic);
        assert!(s.attributes.trigger);
        assert_eq!(s.data.words[0], 7);

        let l = FilterShape::of(&colliders[loose], &bodies);
        assert_eq!(l.attributes.kind, FilterObjectType::Static);
        assert!(!l.attributes.trigger);
    }
}
