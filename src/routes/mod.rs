use std::path::Path;

use ahash::HashMap;
use itertools::Itertools;

use crate::error::Result;
use crate::io::params::Params;
use crate::io::SumoId;
use crate::routes::attributes::{Color, DepartLane, DepartPos, DepartSpeed, VehicleClass};

pub mod attributes;
pub mod io;
pub mod validation;

pub const DEFAULT_MAX_SPEED: f64 = 55.55;
pub const DEFAULT_ACCEL: f64 = 2.6;
pub const DEFAULT_DECEL: f64 = 4.5;
pub const DEFAULT_SIGMA: f64 = 0.5;
pub const DEFAULT_TAU: f64 = 1.0;
pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;
pub const DEFAULT_SPEED_DEV: f64 = 0.1;

/// Kinematic and behavioral parameters of a vehicle type. `None` means the attribute was not
/// declared and the simulator default applies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Kinematics {
    pub max_speed: Option<f64>,
    pub accel: Option<f64>,
    pub decel: Option<f64>,
    pub sigma: Option<f64>,
    pub tau: Option<f64>,
    pub speed_factor: Option<f64>,
    pub speed_dev: Option<f64>,
    pub congestion_threshold: Option<f64>,
}

impl Kinematics {
    pub fn max_speed(&self) -> f64 {
        self.max_speed.unwrap_or(DEFAULT_MAX_SPEED)
    }

    pub fn accel(&self) -> f64 {
        self.accel.unwrap_or(DEFAULT_ACCEL)
    }

    pub fn decel(&self) -> f64 {
        self.decel.unwrap_or(DEFAULT_DECEL)
    }

    pub fn sigma(&self) -> f64 {
        self.sigma.unwrap_or(DEFAULT_SIGMA)
    }

    pub fn tau(&self) -> f64 {
        self.tau.unwrap_or(DEFAULT_TAU)
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor.unwrap_or(DEFAULT_SPEED_FACTOR)
    }

    pub fn speed_dev(&self) -> f64 {
        self.speed_dev.unwrap_or(DEFAULT_SPEED_DEV)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleType {
    pub id: String,
    pub class: Option<VehicleClass>,
    pub gui_shape: Option<String>,
    pub color: Option<Color>,
    pub kinematics: Kinematics,
}

impl VehicleType {
    pub fn new(id: impl Into<String>) -> Self {
        VehicleType {
            id: id.into(),
            class: None,
            gui_shape: None,
            color: None,
            kinematics: Kinematics::default(),
        }
    }
}

impl SumoId for VehicleType {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub vehicle_type: String,
    pub depart: f64,
    pub depart_lane: Option<DepartLane>,
    pub depart_pos: Option<DepartPos>,
    pub depart_speed: Option<DepartSpeed>,
    pub from: String,
    pub to: String,
    pub params: Params,
}

impl Trip {
    pub fn new(
        id: impl Into<String>,
        vehicle_type: impl Into<String>,
        depart: f64,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Trip {
            id: id.into(),
            vehicle_type: vehicle_type.into(),
            depart,
            depart_lane: None,
            depart_pos: None,
            depart_speed: None,
            from: from.into(),
            to: to.into(),
            params: Params::new(),
        }
    }
}

impl SumoId for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One declaration of a route file. Types and trips may be interleaved, so the file keeps a
/// single list in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEntry {
    VehicleType(VehicleType),
    Trip(Trip),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteFile {
    entries: Vec<RouteEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSummary {
    pub vehicle_type: String,
    pub trips: usize,
    pub first_departure: Option<f64>,
    pub last_departure: Option<f64>,
}

impl RouteFile {
    pub fn new() -> Self {
        RouteFile::default()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        io::load_from_xml(path)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        io::write_to_xml(self, path)
    }

    pub fn from_xml_str(xml: &str) -> Result<Self> {
        io::from_xml_str(xml)
    }

    pub fn to_xml_string(&self) -> Result<String> {
        io::to_xml_string(self)
    }

    pub fn push_vehicle_type(&mut self, vehicle_type: VehicleType) {
        self.entries.push(RouteEntry::VehicleType(vehicle_type));
    }

    pub fn push_trip(&mut self, trip: Trip) {
        self.entries.push(RouteEntry::Trip(trip));
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn vehicle_types(&self) -> impl Iterator<Item = &VehicleType> {
        self.entries.iter().filter_map(|e| match e {
            RouteEntry::VehicleType(t) => Some(t),
            RouteEntry::Trip(_) => None,
        })
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.entries.iter().filter_map(|e| match e {
            RouteEntry::Trip(t) => Some(t),
            RouteEntry::VehicleType(_) => None,
        })
    }

    pub fn trips_mut(&mut self) -> impl Iterator<Item = &mut Trip> {
        self.entries.iter_mut().filter_map(|e| match e {
            RouteEntry::Trip(t) => Some(t),
            RouteEntry::VehicleType(_) => None,
        })
    }

    /// First declaration wins if an id is declared twice.
    pub fn vehicle_type(&self, id: &str) -> Option<&VehicleType> {
        self.vehicle_types().find(|t| t.id == id)
    }

    pub fn trip(&self, id: &str) -> Option<&Trip> {
        self.trips().find(|t| t.id == id)
    }

    pub fn trips_of_type<'a>(&'a self, type_id: &'a str) -> impl Iterator<Item = &'a Trip> + 'a {
        self.trips().filter(move |t| t.vehicle_type == type_id)
    }

    /// Trips grouped by vehicle type. Groups are ordered by the first appearance of their type in
    /// the trip list, and trips keep their file order within a group.
    pub fn departure_groups(&self) -> Vec<(&str, Vec<&Trip>)> {
        let mut position: HashMap<&str, usize> = HashMap::default();
        let mut groups: Vec<(&str, Vec<&Trip>)> = Vec::new();
        for trip in self.trips() {
            let type_id = trip.vehicle_type.as_str();
            let index = *position.entry(type_id).or_insert_with(|| {
                groups.push((type_id, Vec::new()));
                groups.len() - 1
            });
            groups[index].1.push(trip);
        }
        groups
    }

    pub fn summary(&self) -> Vec<TypeSummary> {
        self.vehicle_types()
            .map(|t| t.id.as_str())
            .unique()
            .map(|type_id| {
                let departures = self.trips_of_type(type_id).map(|t| t.depart).collect_vec();
                TypeSummary {
                    vehicle_type: type_id.to_string(),
                    trips: departures.len(),
                    first_departure: departures.iter().copied().reduce(f64::min),
                    last_departure: departures.iter().copied().reduce(f64::max),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::{RouteFile, Trip, VehicleType};

    fn file() -> RouteFile {
        let mut routes = RouteFile::new();
        routes.push_vehicle_type(VehicleType::new("veh_ambulance"));
        routes.push_vehicle_type(VehicleType::new("veh_police"));
        routes.push_trip(Trip::new("amb_0", "veh_ambulance", 10., "a", "b"));
        routes.push_trip(Trip::new("pol_0", "veh_police", 5., "a", "c"));
        routes.push_trip(Trip::new("amb_1", "veh_ambulance", 60., "b", "c"));
        routes
    }

    #[test]
    fn groups_keep_file_order() {
        let routes = file();
        let groups = routes.departure_groups();

        assert_eq!(2, groups.len());
        assert_eq!("veh_ambulance", groups[0].0);
        let ids: Vec<_> = groups[0].1.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(vec!["amb_0", "amb_1"], ids);
        assert_eq!("veh_police", groups[1].0);
    }

    #[test]
    fn summary_per_type() {
        let routes = file();
        let summary = routes.summary();

        assert_eq!(2, summary.len());
        assert_eq!(2, summary[0].trips);
        assert_eq!(Some(10.), summary[0].first_departure);
        assert_eq!(Some(60.), summary[0].last_departure);
        assert_eq!(1, summary[1].trips);
    }

    #[test]
    fn lookup() {
        let routes = file();
        assert!(routes.vehicle_type("veh_police").is_some());
        assert!(routes.vehicle_type("veh_firefighter").is_none());
        assert_eq!("c", routes.trip("pol_0").unwrap().to);
        assert_eq!(2, routes.trips_of_type("veh_ambulance").count());
    }
}
