//! Editor-plugin side of baton: the host-collaborator boundary, the
//! incremental search session, the background suggestion fetcher, and the
//! plugin facade that wires commands to the player.

pub mod api;
pub mod buffer;
pub mod fetcher;
pub mod host;
pub mod plugin;
pub mod session;
