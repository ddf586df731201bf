pub mod actor;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod factory;
pub mod filter;
pub mod flags;
pub mod geometry;
pub mod material;
pub mod math;
pub mod scene;
pub mod settings;
pub mod simulation;
pub mod world;

pub use actor::{Actor, ActorHandle, ActorKind, ActorState, ShapeHandle};
pub use config::{TolerancesScale, WorldConfig};
pub use debug::{DebugConnection, SceneDebugClient, SceneDebugFlag, SceneDebugFlags};
pub use error::{Result, WorldError};
pub use events::{
    ContactEvents, ContactPairReport, ContactPoint, ContactReportCallback, NoopCallback,
    SimulationEventCallback, SinkState, TriggerReport,
};
pub use factory::{stack_box_count, stack_layout};
pub use filter::{
    FilterData, FilterObjectAttributes, FilterObjectType, FilterPolicy, FilterShape, PairFlag,
    PairFlags, default_simulation_policy, report_all_contacts,
};
pub use geometry::Geometry;
pub use material::{Material, MaterialHandle};
pub use math::{Plane, Transform, Vec3};
pub use scene::{Scene, SceneDesc};
pub use settings::{DEFAULT_GRAVITY, DEFAULT_TIMESTEP, REFERENCE_MASS};
pub use simulation::StepSummary;
pub use world::World;
