//! Structural and range checks for route files.
//!
//! The simulator itself diagnoses broken route files only when a run starts. These checks catch
//! the same problems up front: duplicated ids, dangling type references, implausible kinematic
//! parameters, negative departures and unknown edges.

use std::fmt::{Display, Formatter};

use ahash::{HashMap, HashSet};
use tracing::{info, warn};

use crate::io::SumoId;
use crate::network::Network;
use crate::routes::{RouteFile, Trip, VehicleType};

pub const MIN_TAU: f64 = 1.0;
pub const MAX_PLAUSIBLE_SPEED: f64 = 100.0;
pub const MAX_PLAUSIBLE_ACCEL: f64 = 10.0;
pub const MAX_PLAUSIBLE_DECEL: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    DuplicateTypeId,
    DuplicateTripId,
    /// A trip uses the id of a vehicle type. SUMO keeps both in separate namespaces, but it is
    /// confusing enough to reject.
    IdSharedByTypeAndTrip,
    UnknownVehicleType { vehicle_type: String },
    NonPositive { attribute: &'static str, value: f64 },
    TauBelowMinimum { value: f64 },
    OutOfRange {
        attribute: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    NegativeDeparture { depart: f64 },
    NonFiniteDeparture { depart: f64 },
    DepartureOutOfOrder { previous: f64, depart: f64 },
    UnknownEdge { attribute: &'static str, edge: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub subject: String,
    pub kind: IssueKind,
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{severity} [{}]: ", self.subject)?;
        match &self.kind {
            IssueKind::DuplicateTypeId => write!(f, "vehicle type id is declared more than once"),
            IssueKind::DuplicateTripId => write!(f, "trip id is declared more than once"),
            IssueKind::IdSharedByTypeAndTrip => write!(f, "id is used by a type and a trip"),
            IssueKind::UnknownVehicleType { vehicle_type } => {
                write!(f, "references undeclared vehicle type '{vehicle_type}'")
            }
            IssueKind::NonPositive { attribute, value } => {
                write!(f, "{attribute}={value} must be positive")
            }
            IssueKind::TauBelowMinimum { value } => {
                write!(f, "tau={value} must not be smaller than {MIN_TAU}")
            }
            IssueKind::OutOfRange {
                attribute,
                value,
                min,
                max,
            } => write!(f, "{attribute}={value} is outside of [{min}, {max}]"),
            IssueKind::NegativeDeparture { depart } => {
                write!(f, "departure {depart} is negative")
            }
            IssueKind::NonFiniteDeparture { depart } => {
                write!(f, "departure {depart} is not a finite time")
            }
            IssueKind::DepartureOutOfOrder { previous, depart } => write!(
                f,
                "departure {depart} is earlier than the previous departure {previous} of the same type"
            ),
            IssueKind::UnknownEdge { attribute, edge } => {
                write!(f, "{attribute} edge '{edge}' is not part of the network")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    fn error(&mut self, subject: &str, kind: IssueKind) {
        self.issues.push(Issue {
            severity: Severity::Error,
            subject: subject.to_string(),
            kind,
        });
    }

    fn warning(&mut self, subject: &str, kind: IssueKind) {
        self.issues.push(Issue {
            severity: Severity::Warning,
            subject: subject.to_string(),
            kind,
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn log(&self) {
        for issue in &self.issues {
            match issue.severity {
                Severity::Error => warn!("{issue}"),
                Severity::Warning => info!("{issue}"),
            }
        }
    }
}

pub fn validate(routes: &RouteFile) -> ValidationReport {
    let mut report = ValidationReport::default();

    for id in duplicates(routes.vehicle_types()) {
        report.error(id, IssueKind::DuplicateTypeId);
    }
    for id in duplicates(routes.trips()) {
        report.error(id, IssueKind::DuplicateTripId);
    }

    let type_ids: HashSet<&str> = routes.vehicle_types().map(|t| t.id()).collect();
    let mut shared: Vec<&str> = routes
        .trips()
        .map(|t| t.id())
        .filter(|id| type_ids.contains(id))
        .collect();
    shared.dedup();
    for id in shared {
        report.error(id, IssueKind::IdSharedByTypeAndTrip);
    }

    for vehicle_type in routes.vehicle_types() {
        check_vehicle_type(vehicle_type, &mut report);
    }

    for trip in routes.trips() {
        check_trip(trip, &type_ids, &mut report);
    }

    for (_, trips) in routes.departure_groups() {
        check_departure_order(&trips, &mut report);
    }

    report
}

/// Like [validate], but additionally checks that every trip starts and ends on an edge of
/// `network`.
pub fn validate_against_network(routes: &RouteFile, network: &Network) -> ValidationReport {
    let mut report = validate(routes);
    for trip in routes.trips() {
        if !network.has_edge(&trip.from) {
            report.error(
                &trip.id,
                IssueKind::UnknownEdge {
                    attribute: "from",
                    edge: trip.from.clone(),
                },
            );
        }
        if !network.has_edge(&trip.to) {
            report.error(
                &trip.id,
                IssueKind::UnknownEdge {
                    attribute: "to",
                    edge: trip.to.clone(),
                },
            );
        }
    }
    report
}

/// Ids which occur more than once, each reported a single time in order of first repetition.
fn duplicates<'a, T, I>(items: I) -> Vec<&'a str>
where
    T: SumoId + 'a,
    I: Iterator<Item = &'a T>,
{
    let mut seen: HashMap<&str, usize> = HashMap::default();
    let mut result = Vec::new();
    for item in items {
        let count = seen.entry(item.id()).or_insert(0);
        *count += 1;
        if *count == 2 {
            result.push(item.id());
        }
    }
    result
}

fn check_vehicle_type(vehicle_type: &VehicleType, report: &mut ValidationReport) {
    let k = &vehicle_type.kinematics;
    let id = vehicle_type.id.as_str();

    let positive = [
        ("maxSpeed", k.max_speed),
        ("accel", k.accel),
        ("decel", k.decel),
        ("sigma", k.sigma),
        ("tau", k.tau),
        ("speedFactor", k.speed_factor),
        ("speedDev", k.speed_dev),
        ("congestionThreshold", k.congestion_threshold),
    ];
    for (attribute, value) in positive {
        if let Some(value) = value {
            // also catches NaN
            if !(value > 0.) {
                report.error(id, IssueKind::NonPositive { attribute, value });
            }
        }
    }

    if let Some(tau) = k.tau {
        if tau > 0. && tau < MIN_TAU {
            report.error(id, IssueKind::TauBelowMinimum { value: tau });
        }
    }

    let upper_bounds = [
        ("maxSpeed", k.max_speed, MAX_PLAUSIBLE_SPEED),
        ("accel", k.accel, MAX_PLAUSIBLE_ACCEL),
        ("decel", k.decel, MAX_PLAUSIBLE_DECEL),
        ("sigma", k.sigma, 1.),
        ("speedDev", k.speed_dev, f64::MAX),
    ];
    for (attribute, value, max) in upper_bounds {
        // non-positive values were reported above already
        if let Some(value) = value.filter(|v| *v > 0. && *v > max) {
            report.error(
                id,
                IssueKind::OutOfRange {
                    attribute,
                    value,
                    min: 0.,
                    max,
                },
            );
        }
    }
}

fn check_trip(trip: &Trip, type_ids: &HashSet<&str>, report: &mut ValidationReport) {
    if !type_ids.contains(trip.vehicle_type.as_str()) {
        report.error(
            &trip.id,
            IssueKind::UnknownVehicleType {
                vehicle_type: trip.vehicle_type.clone(),
            },
        );
    }
    if !trip.depart.is_finite() {
        report.error(
            &trip.id,
            IssueKind::NonFiniteDeparture {
                depart: trip.depart,
            },
        );
    } else if trip.depart < 0. {
        report.error(
            &trip.id,
            IssueKind::NegativeDeparture {
                depart: trip.depart,
            },
        );
    }
}

fn check_departure_order(trips: &[&Trip], report: &mut ValidationReport) {
    // non-finite departures are errors already and cannot be ordered
    let timed: Vec<&Trip> = trips
        .iter()
        .copied()
        .filter(|t| t.depart.is_finite())
        .collect();
    for pair in timed.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.depart < previous.depart {
            report.warning(
                &current.id,
                IssueKind::DepartureOutOfOrder {
                    previous: previous.depart,
                    depart: current.depart,
                },
            );
        }
    }
}
