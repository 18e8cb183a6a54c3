//! Signal preemption for emergency vehicles.
//!
//! Every simulation step, emergency vehicles are visited in order of their priority. Each
//! traffic light within the detection radius which the vehicle is about to pass is switched to
//! red for everything except the vehicle's approach. A signal stays preempted until its holder
//! has left the detection radius or the simulation, and then returns to the program, phase and
//! remaining phase duration it had before the first preemption.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, info};

use crate::config::Preemption;
use crate::error::Result;
use crate::network::{edge_of_lane, is_internal_edge};

pub mod control;

pub use control::TrafficControl;

/// Emergency vehicle which currently holds a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Hold {
    pub vehicle: String,
    pub priority: u32,
    pub approach_link: usize,
}

/// Signal state saved before the first preemption of a traffic light.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMemory {
    pub program: String,
    pub phase: usize,
    pub phase_duration: f64,
    pub remaining_duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySignal {
    pub tls: String,
    pub distance: f64,
    pub approach_link: usize,
}

pub struct PreemptionController<C: TrafficControl> {
    control: C,
    settings: Preemption,
    held: BTreeMap<String, Hold>,
    memory: BTreeMap<String, SignalMemory>,
}

impl<C: TrafficControl> PreemptionController<C> {
    pub fn new(control: C, settings: Preemption) -> Self {
        PreemptionController {
            control,
            settings,
            held: BTreeMap::new(),
            memory: BTreeMap::new(),
        }
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    pub fn into_inner(self) -> C {
        self.control
    }

    pub fn hold(&self, tls: &str) -> Option<&Hold> {
        self.held.get(tls)
    }

    pub fn memory(&self, tls: &str) -> Option<&SignalMemory> {
        self.memory.get(tls)
    }

    pub fn preempted_signals(&self) -> impl Iterator<Item = &str> {
        self.held.keys().map(String::as_str)
    }

    /// Priority of a vehicle type. `None` for normal traffic, which never preempts.
    pub fn priority_of(&self, vehicle_type: &str) -> Option<u32> {
        if vehicle_type == self.settings.normal_type {
            return None;
        }
        self.settings.priorities.get(vehicle_type).copied()
    }

    /// Index of the first link of `tls` which starts on the vehicle's current or next edge.
    /// `None` if the vehicle is on the last edge of its route or approaches from elsewhere.
    pub fn approach_link(&self, vehicle: &str, tls: &str) -> Result<Option<usize>> {
        let route = self.control.route(vehicle)?;
        let route_index = self.control.route_index(vehicle)?;
        if route_index + 1 >= route.len() {
            return Ok(None);
        }

        let current_edge = self.control.road_id(vehicle)?;
        let next_edge = &route[route_index + 1];

        let links = self.control.controlled_links(tls)?;
        let approach = links.iter().position(|links| {
            links.iter().any(|link| {
                let edge = link.incoming_edge();
                edge == current_edge || edge == next_edge
            })
        });
        Ok(approach)
    }

    /// Signals within the detection radius which the vehicle approaches, nearest first.
    pub fn nearby_signals(&self, vehicle: &str) -> Result<Vec<NearbySignal>> {
        // vehicles inside a junction are past its signal already
        if is_internal_edge(&self.control.road_id(vehicle)?) {
            return Ok(Vec::new());
        }

        let position = self.control.vehicle_position(vehicle)?;
        let mut nearby = Vec::new();
        for tls in self.control.tls_ids()? {
            let distance = position.distance(&self.control.junction_position(&tls)?);
            if distance > self.settings.detection_radius {
                continue;
            }
            if let Some(approach_link) = self.approach_link(vehicle, &tls)? {
                nearby.push(NearbySignal {
                    tls,
                    distance,
                    approach_link,
                });
            }
        }
        nearby.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(nearby)
    }

    /// Gives green to the approach of `vehicle`. Returns `false` if the signal is already held
    /// by a vehicle with the same or a higher priority.
    pub fn preempt(
        &mut self,
        tls: &str,
        approach_link: usize,
        vehicle: &str,
        priority: u32,
    ) -> Result<bool> {
        if let Some(hold) = self.held.get(tls) {
            if hold.priority <= priority {
                debug!(
                    "TLS {tls} stays with {} (priority {}), {vehicle} has priority {priority}",
                    hold.vehicle, hold.priority
                );
                return Ok(false);
            }
        }

        let memory = if self.memory.contains_key(tls) {
            None
        } else {
            let now = self.control.current_time()?;
            Some(SignalMemory {
                program: self.control.program(tls)?,
                phase: self.control.phase(tls)?,
                phase_duration: self.control.phase_duration(tls)?,
                remaining_duration: self.control.next_switch(tls)? - now,
            })
        };

        let num_links = self.control.signal_state(tls)?.chars().count();
        let links = self.control.controlled_links(tls)?;
        let approach_edge = links
            .get(approach_link)
            .and_then(|l| l.first())
            .map(|l| edge_of_lane(&l.incoming_lane).to_string());

        let new_state: String = (0..num_links)
            .map(|i| {
                let same_approach = approach_edge.as_deref().is_some_and(|edge| {
                    links
                        .get(i)
                        .is_some_and(|l| l.iter().any(|link| link.incoming_edge() == edge))
                });
                if i == approach_link || same_approach {
                    'G'
                } else {
                    'r'
                }
            })
            .collect();

        // only remember the state once the signal is actually ours
        self.control.set_signal_state(tls, &new_state)?;
        if let Some(memory) = memory {
            self.memory.insert(tls.to_string(), memory);
        }
        self.held.insert(
            tls.to_string(),
            Hold {
                vehicle: vehicle.to_string(),
                priority,
                approach_link,
            },
        );

        info!(
            "Preempting TLS {tls} for {vehicle} (priority {priority}) on approach {approach_link}"
        );
        Ok(true)
    }

    /// Returns the signal to its state before the first preemption.
    pub fn restore(&mut self, tls: &str) -> Result<()> {
        if let Some(memory) = self.memory.remove(tls) {
            self.control.set_program(tls, &memory.program)?;
            self.control.set_phase(tls, memory.phase)?;
            self.control
                .set_phase_duration(tls, memory.remaining_duration)?;
        }

        if self.held.remove(tls).is_some() {
            info!("Restored TLS {tls} to normal operation");
        }
        Ok(())
    }

    /// Whether the vehicle holding `tls` is still in the simulation and within the detection
    /// radius.
    pub fn holder_still_near(&self, tls: &str) -> Result<bool> {
        let Some(hold) = self.held.get(tls) else {
            return Ok(false);
        };

        if !self.control.vehicle_ids()?.contains(&hold.vehicle) {
            return Ok(false);
        }

        let position = self.control.vehicle_position(&hold.vehicle)?;
        let junction = self.control.junction_position(tls)?;
        Ok(position.distance(&junction) <= self.settings.detection_radius)
    }

    pub fn process_emergency_vehicles(&mut self) -> Result<()> {
        let mut emergency_vehicles = Vec::new();
        for vehicle in self.control.vehicle_ids()? {
            let vehicle_type = self.control.vehicle_type(&vehicle)?;
            if let Some(priority) = self.priority_of(&vehicle_type) {
                emergency_vehicles.push((vehicle, priority));
            }
        }
        // stable, so vehicles of equal priority keep the simulator's order
        emergency_vehicles.sort_by_key(|(_, priority)| *priority);

        for (vehicle, priority) in emergency_vehicles {
            for signal in self.nearby_signals(&vehicle)? {
                self.preempt(&signal.tls, signal.approach_link, &vehicle, priority)?;
            }
        }
        Ok(())
    }

    /// Restores all signals whose holder has passed. Returns their ids.
    pub fn release_passed_junctions(&mut self) -> Result<Vec<String>> {
        let held = self.held.keys().cloned().collect_vec();
        let mut released = Vec::new();
        for tls in held {
            if !self.holder_still_near(&tls)? {
                released.push(tls);
            }
        }
        for tls in &released {
            self.restore(tls)?;
        }
        Ok(released)
    }

    pub fn step(&mut self) -> Result<()> {
        self.control.simulation_step()?;
        self.process_emergency_vehicles()?;
        self.release_passed_junctions()?;
        Ok(())
    }

    /// Steps the simulation until no vehicles are expected anymore. Returns the number of steps.
    pub fn run(&mut self) -> Result<usize> {
        let mut steps = 0;
        while self.control.min_expected_vehicles()? > 0 {
            self.step()?;
            steps += 1;
        }
        info!("Simulation completed after {steps} steps, all vehicles have arrived");
        Ok(steps)
    }
}
