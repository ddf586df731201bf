//! Per-world configuration.
//!
//! [`WorldConfig::default`] reproduces the stock setup: two workers, unit
//! tolerances, a 10 kg reference mass and no debug connection.

use std::net::{Ipv4Addr, SocketAddr};

use crate::error::{Result, WorldError};
use crate::settings::{
    DEFAULT_DEBUG_PORT, DEFAULT_LENGTH_UNIT, DEFAULT_SPEED_UNIT, DEFAULT_WORKER_COUNT,
    REFERENCE_MASS,
};

/// Typical scale of the simulated objects.
///
/// The backend derives its internal tolerances from `length`; both values are
/// checked before any engine state is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TolerancesScale {
    /// Typical object length (meters).
    pub length: f32,
    /// Typical object speed (m/s).
    pub speed: f32,
}

impl Default for TolerancesScale {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH_UNIT,
            speed: DEFAULT_SPEED_UNIT,
        }
    }
}

impl TolerancesScale {
    /// Both values must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.length) && ok(self.speed) {
            Ok(())
        } else {
            Err(WorldError::InvalidTolerances {
                length: self.length,
                speed: self.speed,
            })
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Threads in the scene dispatcher. Fixed for the world's lifetime.
    pub worker_count: usize,
    pub tolerances: TolerancesScale,
    /// Mass given to every dynamic body built by the actor factory (kg).
    pub reference_mass: f32,
    /// Debug viewer to stream to. `None` skips the connection attempt.
    pub debug_address: Option<SocketAddr>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            tolerances: TolerancesScale::default(),
            reference_mass: REFERENCE_MASS,
            debug_address: None,
        }
    }
}

impl WorldConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_tolerances(mut self, tolerances: TolerancesScale) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn with_reference_mass(mut self, reference_mass: f32) -> Self {
        self.reference_mass = reference_mass;
        self
    }

    pub fn with_debugger(mut self, address: SocketAddr) -> Self {
        self.debug_address = Some(address);
        self
    }

    /// Stream to a debug viewer on this machine's conventional port.
    pub fn with_local_debugger(self) -> Self {
        self.with_debugger(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_DEBUG_PORT)))
    }
}
