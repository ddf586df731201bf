//! The world: engine-wide state and the one active scene.
//!
//! A [`World`] owns everything the simulation needs: the worker dispatcher,
//! the material registry, the optional debug connection and the active
//! [`Scene`]. There is no global state; each `World` is independent.
//!
//! Fields are released in reverse order of creation: the scene first, then
//! the dispatcher, the materials and finally the debug connection.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::actor::{Actor, ActorHandle};
use crate::config::WorldConfig;
use crate::debug::{DebugConnection, SceneDebugClient, SceneDebugFlag};
use crate::error::{Result, WorldError};
use crate::material::{Material, MaterialHandle, MaterialRegistry};
use crate::math::Vec3;
use crate::scene::{Scene, SceneDesc};
use crate::settings::DEBUG_CONNECT_TIMEOUT;

pub struct World {
    pub(crate) scene: Option<Scene>,
    pub(crate) dispatcher: ThreadPool,
    pub(crate) materials: MaterialRegistry,
    config: WorldConfig,
    debugger: Option<DebugConnection>,
}

impl World {
    /// Bring up the engine.
    ///
    /// Invalid tolerances and dispatcher failures are fatal. An unreachable
    /// debug viewer is not: the world simply runs without one.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.tolerances.validate()?;
        if config.worker_count == 0 {
            return Err(WorldError::InvalidWorkerCount(config.worker_count));
        }

        let dispatcher = ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .thread_name(|i| format!("physics-worker-{i}"))
            .build()?;

        let debugger = config
            .debug_address
            .and_then(|address| DebugConnection::connect(address, DEBUG_CONNECT_TIMEOUT));

        log::info!(
            "physics world ready: {} workers, length unit {}, debugger {}",
            config.worker_count,
            config.tolerances.length,
            if debugger.is_some() { "connected" } else { "off" }
        );

        Ok(Self {
            scene: None,
            dispatcher,
            materials: MaterialRegistry::new(),
            config,
            debugger,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.dispatcher.current_num_threads()
    }

    pub fn debugger(&self) -> Option<&DebugConnection> {
        self.debugger.as_ref()
    }

    /// Create the active scene with the stock wiring: report every contact
    /// into a fresh contact aggregator.
    pub fn create_scene(&mut self, gravity: Vec3) -> &mut Scene {
        self.create_scene_with(SceneDesc::new(gravity))
    }

    /// Create the active scene from an explicit description, replacing (and
    /// dropping) any previous one.
    pub fn create_scene_with(&mut self, desc: SceneDesc) -> &mut Scene {
        let mut scene = Scene::new(desc, self.config.tolerances.length);

        scene.debug_client = self
            .debugger
            .as_ref()
            .and_then(SceneDebugClient::attach)
            .map(|mut client| {
                client.set_flag(SceneDebugFlag::TransmitConstraints, true);
                client.set_flag(SceneDebugFlag::TransmitContacts, true);
                client.set_flag(SceneDebugFlag::TransmitSceneQueries, true);
                client
            });

        if self.scene.is_some() {
            log::info!("replacing active scene");
        }
        log::info!(
            "scene created: gravity [{}, {}, {}], debug client {}",
            scene.gravity.x,
            scene.gravity.y,
            scene.gravity.z,
            scene.debug_client.is_some()
        );

        self.scene.insert(scene)
    }

    pub fn scene(&self) -> Result<&Scene> {
        self.scene.as_ref().ok_or(WorldError::NoScene)
    }

    pub fn scene_mut(&mut self) -> Result<&mut Scene> {
        self.scene.as_mut().ok_or(WorldError::NoScene)
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Register a material. Values are stored as given.
    pub fn create_material(
        &mut self,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> MaterialHandle {
        self.materials
            .create(static_friction, dynamic_friction, restitution)
    }

    pub fn material(&self, handle: MaterialHandle) -> Result<&Material> {
        self.materials
            .get(handle)
            .ok_or(WorldError::UnknownMaterial(handle))
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Add an actor built outside the scene (e.g. by [`World::create_plane`]).
    pub fn add_actor(&mut self, actor: Actor) -> Result<ActorHandle> {
        self.scene_mut()?.add_actor(actor)
    }
}
