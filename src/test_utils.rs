//! In-memory stand-in for a running simulation, used by the tests of the preemption controller.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::network::{ControlledLink, Network, Position};
use crate::preemption::TrafficControl;
use crate::routes::{RouteFile, Trip, VehicleType};

/// Ambulance, firefighter and police types with plausible kinematics.
pub fn emergency_vehicle_types() -> Vec<VehicleType> {
    [
        ("veh_ambulance", "emergency", "emergency", 33.33),
        ("veh_firefighter", "emergency", "firebrigade", 27.78),
        ("veh_police", "authority", "police", 36.11),
    ]
    .into_iter()
    .map(|(id, class, shape, max_speed)| {
        let mut t = VehicleType::new(id);
        t.class = Some(class.into());
        t.gui_shape = Some(shape.to_string());
        t.kinematics.max_speed = Some(max_speed);
        t.kinematics.accel = Some(3.);
        t.kinematics.decel = Some(6.);
        t.kinematics.sigma = Some(0.2);
        t.kinematics.tau = Some(1.);
        t.kinematics.speed_factor = Some(1.5);
        t.kinematics.speed_dev = Some(0.1);
        t
    })
    .collect()
}

pub fn route_file_with_trips(trips: Vec<Trip>) -> RouteFile {
    let mut routes = RouteFile::new();
    for t in emergency_vehicle_types() {
        routes.push_vehicle_type(t);
    }
    for trip in trips {
        routes.push_trip(trip);
    }
    routes
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    pub vehicle_type: String,
    pub position: Position,
    /// Movement per simulation step.
    pub velocity: Position,
    pub road: String,
    pub route: Vec<String>,
    pub route_index: usize,
    /// The vehicle is removed on the first step at or after this time.
    pub leave_at: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimSignal {
    pub position: Position,
    pub links: Vec<Vec<ControlledLink>>,
    pub program: String,
    pub phase: usize,
    pub phase_duration: f64,
    pub next_switch: f64,
    pub state: String,
}

/// Commands the controller issued, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetState { tls: String, state: String },
    SetProgram { tls: String, program: String },
    SetPhase { tls: String, phase: usize },
    SetPhaseDuration { tls: String, duration: f64 },
}

#[derive(Debug, Default)]
pub struct InMemoryControl {
    pub time: f64,
    /// Vehicles that have not departed yet but count towards the expected number.
    pub pending: usize,
    vehicles: Vec<(String, SimVehicle)>,
    signals: BTreeMap<String, SimSignal>,
    pub commands: Vec<Command>,
    /// Makes [TrafficControl::set_signal_state] fail, like a lost simulator connection.
    pub reject_state_changes: bool,
}

impl InMemoryControl {
    pub fn new() -> Self {
        InMemoryControl::default()
    }

    /// Creates one signal per traffic light of `network`, running the first phase of its first
    /// program.
    pub fn from_network(network: &Network) -> Self {
        let mut control = InMemoryControl::new();
        for tls in network.tls_ids() {
            let Some(program) = network.programs(tls).next() else {
                continue;
            };
            let position = network
                .junction(tls)
                .map(|j| j.position)
                .unwrap_or_default();
            let (duration, state) = program
                .phases
                .first()
                .map(|p| (p.duration, p.state.clone()))
                .unwrap_or_default();
            control.add_signal(
                tls,
                SimSignal {
                    position,
                    links: network.controlled_links(tls),
                    program: program.program_id.clone(),
                    phase: 0,
                    phase_duration: duration,
                    next_switch: duration,
                    state,
                },
            );
        }
        control
    }

    pub fn add_vehicle(&mut self, id: &str, vehicle: SimVehicle) {
        self.vehicles.push((id.to_string(), vehicle));
    }

    pub fn add_signal(&mut self, id: &str, signal: SimSignal) {
        self.signals.insert(id.to_string(), signal);
    }

    pub fn remove_vehicle(&mut self, id: &str) {
        self.vehicles.retain(|(v, _)| v != id);
    }

    pub fn vehicle_mut(&mut self, id: &str) -> Option<&mut SimVehicle> {
        self.vehicles
            .iter_mut()
            .find(|(v, _)| v == id)
            .map(|(_, vehicle)| vehicle)
    }

    pub fn signal(&self, id: &str) -> Option<&SimSignal> {
        self.signals.get(id)
    }

    fn vehicle(&self, id: &str) -> Result<&SimVehicle> {
        self.vehicles
            .iter()
            .find(|(v, _)| v == id)
            .map(|(_, vehicle)| vehicle)
            .ok_or_else(|| Error::Control(format!("unknown vehicle {id}")))
    }

    fn signal_ref(&self, id: &str) -> Result<&SimSignal> {
        self.signals
            .get(id)
            .ok_or_else(|| Error::Control(format!("unknown traffic light {id}")))
    }

    fn signal_mut(&mut self, id: &str) -> Result<&mut SimSignal> {
        self.signals
            .get_mut(id)
            .ok_or_else(|| Error::Control(format!("unknown traffic light {id}")))
    }
}

impl TrafficControl for InMemoryControl {
    fn simulation_step(&mut self) -> Result<()> {
        self.time += 1.;
        let time = self.time;
        for (_, vehicle) in self.vehicles.iter_mut() {
            vehicle.position.x += vehicle.velocity.x;
            vehicle.position.y += vehicle.velocity.y;
        }
        self.vehicles
            .retain(|(_, v)| v.leave_at.map_or(true, |leave_at| time < leave_at));
        Ok(())
    }

    fn current_time(&self) -> Result<f64> {
        Ok(self.time)
    }

    fn min_expected_vehicles(&self) -> Result<usize> {
        Ok(self.vehicles.len() + self.pending)
    }

    fn vehicle_ids(&self) -> Result<Vec<String>> {
        Ok(self.vehicles.iter().map(|(id, _)| id.clone()).collect())
    }

    fn vehicle_type(&self, vehicle: &str) -> Result<String> {
        Ok(self.vehicle(vehicle)?.vehicle_type.clone())
    }

    fn vehicle_position(&self, vehicle: &str) -> Result<Position> {
        Ok(self.vehicle(vehicle)?.position)
    }

    fn road_id(&self, vehicle: &str) -> Result<String> {
        Ok(self.vehicle(vehicle)?.road.clone())
    }

    fn route(&self, vehicle: &str) -> Result<Vec<String>> {
        Ok(self.vehicle(vehicle)?.route.clone())
    }

    fn route_index(&self, vehicle: &str) -> Result<usize> {
        Ok(self.vehicle(vehicle)?.route_index)
    }

    fn tls_ids(&self) -> Result<Vec<String>> {
        Ok(self.signals.keys().cloned().collect())
    }

    fn junction_position(&self, junction: &str) -> Result<Position> {
        Ok(self.signal_ref(junction)?.position)
    }

    fn controlled_links(&self, tls: &str) -> Result<Vec<Vec<ControlledLink>>> {
        Ok(self.signal_ref(tls)?.links.clone())
    }

    fn program(&self, tls: &str) -> Result<String> {
        Ok(self.signal_ref(tls)?.program.clone())
    }

    fn phase(&self, tls: &str) -> Result<usize> {
        Ok(self.signal_ref(tls)?.phase)
    }

    fn phase_duration(&self, tls: &str) -> Result<f64> {
        Ok(self.signal_ref(tls)?.phase_duration)
    }

    fn next_switch(&self, tls: &str) -> Result<f64> {
        Ok(self.signal_ref(tls)?.next_switch)
    }

    fn signal_state(&self, tls: &str) -> Result<String> {
        Ok(self.signal_ref(tls)?.state.clone())
    }

    fn set_signal_state(&mut self, tls: &str, state: &str) -> Result<()> {
        if self.reject_state_changes {
            return Err(Error::Control(format!("state change of {tls} rejected")));
        }
        let signal = self.signal_mut(tls)?;
        signal.state = state.to_string();
        signal.program = String::from("online");
        self.commands.push(Command::SetState {
            tls: tls.to_string(),
            state: state.to_string(),
        });
        Ok(())
    }

    fn set_program(&mut self, tls: &str, program: &str) -> Result<()> {
        self.signal_mut(tls)?.program = program.to_string();
        self.commands.push(Command::SetProgram {
            tls: tls.to_string(),
            program: program.to_string(),
        });
        Ok(())
    }

    fn set_phase(&mut self, tls: &str, phase: usize) -> Result<()> {
        self.signal_mut(tls)?.phase = phase;
        self.commands.push(Command::SetPhase {
            tls: tls.to_string(),
            phase,
        });
        Ok(())
    }

    fn set_phase_duration(&mut self, tls: &str, duration: f64) -> Result<()> {
        let time = self.time;
        let signal = self.signal_mut(tls)?;
        signal.phase_duration = duration;
        signal.next_switch = time + duration;
        self.commands.push(Command::SetPhaseDuration {
            tls: tls.to_string(),
            duration,
        });
        Ok(())
    }
}
