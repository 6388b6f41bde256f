//! Everything that drives the external desktop player: the control-surface
//! boundary, the player controller with its launch/convergence protocol, and
//! the transient status-line presenter.

pub mod controller;
pub mod status;
pub mod surface;
