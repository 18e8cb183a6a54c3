//! Tooling around the emergency vehicle scenario of a SUMO simulation: reading, validating and
//! repairing route files, reading road networks, and preempting traffic lights for emergency
//! vehicles during a run.

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod network;
pub mod preemption;
pub mod repair;
pub mod routes;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use error::{Error, Result};
