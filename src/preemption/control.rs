use crate::error::Result;
use crate::network::{ControlledLink, Position};

/// The part of a running traffic simulation the preemption controller talks to. Implementations
/// wrap a remote control connection to the simulator; tests use an in-memory double.
///
/// Ids are the simulator's string ids. Times and durations are in seconds.
pub trait TrafficControl {
    fn simulation_step(&mut self) -> Result<()>;

    fn current_time(&self) -> Result<f64>;

    /// Vehicles which are still running or waiting to be inserted.
    fn min_expected_vehicles(&self) -> Result<usize>;

    fn vehicle_ids(&self) -> Result<Vec<String>>;

    fn vehicle_type(&self, vehicle: &str) -> Result<String>;

    fn vehicle_position(&self, vehicle: &str) -> Result<Position>;

    /// Edge the vehicle currently drives on. Internal edges start with `:`.
    fn road_id(&self, vehicle: &str) -> Result<String>;

    fn route(&self, vehicle: &str) -> Result<Vec<String>>;

    /// Index of the current edge within [TrafficControl::route].
    fn route_index(&self, vehicle: &str) -> Result<usize>;

    fn tls_ids(&self) -> Result<Vec<String>>;

    fn junction_position(&self, junction: &str) -> Result<Position>;

    /// Links indexed by link index, as in [crate::network::Network::controlled_links].
    fn controlled_links(&self, tls: &str) -> Result<Vec<Vec<ControlledLink>>>;

    fn program(&self, tls: &str) -> Result<String>;

    fn phase(&self, tls: &str) -> Result<usize>;

    fn phase_duration(&self, tls: &str) -> Result<f64>;

    /// Absolute time of the next phase switch.
    fn next_switch(&self, tls: &str) -> Result<f64>;

    /// One character per link: `r`, `y`, `g`, `G`, ...
    fn signal_state(&self, tls: &str) -> Result<String>;

    fn set_signal_state(&mut self, tls: &str, state: &str) -> Result<()>;

    fn set_program(&mut self, tls: &str, program: &str) -> Result<()>;

    fn set_phase(&mut self, tls: &str, phase: usize) -> Result<()>;

    fn set_phase_duration(&mut self, tls: &str, duration: f64) -> Result<()>;
}
