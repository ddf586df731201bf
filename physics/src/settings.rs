/*!
World defaults and tolerances.

These constants centralize the numbers the world, the actor factory and the
simulation loop fall back to. [`crate::config::WorldConfig`] starts from them;
anything that should vary per world belongs there, not here.

Notes
- Distances are in meters, time in seconds, mass in kilograms.
*/

use std::time::Duration;

/// Worker threads in the scene dispatcher when the config doesn't say otherwise.
pub const DEFAULT_WORKER_COUNT: usize = 2;

/// Fixed simulation step (seconds). No sub-stepping or interpolation happens
/// at this layer.
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

/// Gravity used by scenes built without an explicit vector (m/s^2).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];

/// Mass every dynamic body gets from the factory (kg).
///
/// Not derived from the geometry: a box and a sphere of any size both weigh
/// this much unless the world config overrides it.
pub const REFERENCE_MASS: f32 = 10.0;

/// Angular damping applied by `create_dynamic_sphere`.
pub const DYNAMIC_ANGULAR_DAMPING: f32 = 0.5;

/// Radius of the sphere built by `create_sphere` (meters).
pub const DEFAULT_SPHERE_RADIUS: f32 = 1.0;

/// Typical object length of the simulated world (meters).
/// Forwarded to the backend as its length unit.
pub const DEFAULT_LENGTH_UNIT: f32 = 1.0;

/// Typical object speed of the simulated world (m/s).
pub const DEFAULT_SPEED_UNIT: f32 = 10.0;

/// Port a debug viewer listens on by convention.
pub const DEFAULT_DEBUG_PORT: u16 = 5425;

/// How long `World::new` waits for the debug viewer before giving up.
pub const DEBUG_CONNECT_TIMEOUT: Duration = Duration::from_millis(10);

/// Contact pairs handed to the event callback per dispatcher task.
pub const CONTACT_REPORT_BATCH: usize = 8;
