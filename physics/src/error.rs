//! Error types for world construction and scene operations.

use thiserror::Error;

use crate::actor::{ActorHandle, ShapeHandle};
use crate::material::MaterialHandle;

/// Errors surfaced by the world, its scene and the actor factory.
///
/// Only [`WorldError::InvalidTolerances`], [`WorldError::InvalidWorkerCount`]
/// and [`WorldError::Dispatcher`] are fatal; they come out of `World::new`
/// and leave no world behind. Everything else is a misuse of a live world and
/// leaves it unchanged.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The tolerance scale can't be used to build the engine.
    #[error("invalid tolerances scale: length {length}, speed {speed}")]
    InvalidTolerances {
        /// Typical object length (meters).
        length: f32,
        /// Typical object speed (m/s).
        speed: f32,
    },

    /// The dispatcher needs at least one worker.
    #[error("worker dispatcher needs at least one worker, got {0}")]
    InvalidWorkerCount(usize),

    /// The worker thread pool couldn't be started.
    #[error("failed to start worker dispatcher: {0}")]
    Dispatcher(#[from] rayon::ThreadPoolBuildError),

    /// The operation needs a scene and the world has none yet.
    #[error("world has no active scene")]
    NoScene,

    /// The material handle wasn't issued by this world.
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),

    /// A dynamic actor was added before its mass and inertia were computed.
    #[error("dynamic actor {name:?} added before its mass and inertia were computed")]
    MassNotComputed {
        /// The actor's name, if it was given one.
        name: Option<String>,
    },

    /// The actor isn't part of the active scene.
    #[error("unknown actor {0:?}")]
    UnknownActor(ActorHandle),

    /// The shape isn't part of the active scene.
    #[error("unknown shape {0:?}")]
    UnknownShape(ShapeHandle),

    /// `simulate` was called again before the previous step's results were fetched.
    #[error("simulation results of step {0} have not been fetched")]
    SimulationPending(u64),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, WorldError>;
