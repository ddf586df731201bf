//! Best-effort debug side channel.
//!
//! A world may hold one TCP connection to an external debug viewer. Each
//! scene created while the connection is up gets a [`SceneDebugClient`] that
//! writes one summary line per step. Nothing here is allowed to fail the
//! simulation: connection and write errors are logged and the channel is
//! dropped.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::flags::FlagSet;

crate::define_flags!(
    /// What a scene's debug client streams.
    SceneDebugFlag, u8, {
        TransmitConstraints,
        TransmitContacts,
        TransmitSceneQueries,
    }
);

pub type SceneDebugFlags = FlagSet<SceneDebugFlag>;

/// Open connection to a debug viewer, shared by the world and its scene client.
#[derive(Clone, Debug)]
pub struct DebugConnection {
    address: SocketAddr,
    stream: Arc<Mutex<Option<TcpStream>>>,
}

impl DebugConnection {
    /// Try to reach a viewer at `address`. `None` if nobody answers in time.
    pub fn connect(address: SocketAddr, timeout: Duration) -> Option<Self> {
        match TcpStream::connect_timeout(&address, timeout) {
            Ok(stream) => {
                log::info!("debug viewer connected at {address}");
                Some(Self {
                    address,
                    stream: Arc::new(Mutex::new(Some(stream))),
                })
            }
            Err(err) => {
                log::warn!("debug viewer unavailable at {address}: {err}");
                None
            }
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.lock().is_some()
    }

    /// Write one line. The first failure closes the connection for good.
    fn send_line(&self, line: &str) {
        let mut guard = self.stream.lock();
        let Some(stream) = guard.as_mut() else {
            return;
        };
        if let Err(err) = stream.write_all(line.as_bytes()) {
            log::warn!("debug viewer at {} dropped: {err}", self.address);
            *guard = None;
        }
    }
}

/// Per-step summary sent to the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugFrame {
    pub step: u64,
    pub actors: usize,
    pub contact_pairs: usize,
    pub contact_points: usize,
}

/// A scene's view of the debug connection.
#[derive(Clone, Debug)]
pub struct SceneDebugClient {
    connection: DebugConnection,
    flags: SceneDebugFlags,
}

impl SceneDebugClient {
    /// A client for a live connection, or `None` if the connection is gone.
    pub(crate) fn attach(connection: &DebugConnection) -> Option<Self> {
        connection.is_connected().then(|| Self {
            connection: connection.clone(),
            flags: SceneDebugFlags::empty(),
        })
    }

    pub fn set_flag(&mut self, flag: SceneDebugFlag, enabled: bool) {
        if enabled {
            self.flags.insert(flag);
        } else {
            self.flags.remove(flag);
        }
    }

    pub fn flags(&self) -> SceneDebugFlags {
        self.flags
    }

    pub(crate) fn send_frame(&self, frame: &DebugFrame) {
        if !self.flags.contains(SceneDebugFlag::TransmitContacts) {
            return;
        }
        self.connection.send_line(&format!(
            "step {} actors {} pairs {} points {}\n",
            frame.step, frame.actors, frame.contact_pairs, frame.contact_points
        ));
    }
}
