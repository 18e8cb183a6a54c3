use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::io::params::Param;
use crate::io::xml;
use crate::routes::attributes::{Color, DepartLane, DepartPos, DepartSpeed, VehicleClass};
use crate::routes::{Kinematics, RouteEntry, RouteFile, Trip, VehicleType};

const SCHEMA_LOCATION: &str = "http://sumo.dlr.de/xsd/routes_file.xsd";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub(crate) fn load_from_xml(path: &Path) -> Result<RouteFile> {
    let io_routes: IORoutes = xml::read_from_file(path)?;
    let routes = RouteFile::try_from(io_routes)?;
    info!(
        "Loaded {} vehicle types and {} trips from {path:?}",
        routes.vehicle_types().count(),
        routes.trips().count()
    );
    Ok(routes)
}

pub(crate) fn write_to_xml(routes: &RouteFile, path: &Path) -> Result<()> {
    info!("Converting route file into xml type");
    let io_routes = IORoutes::from(routes);
    xml::write_to_file(&io_routes, path, xml::XML_HEADER)
}

pub(crate) fn from_xml_str(xml: &str) -> Result<RouteFile> {
    let io_routes: IORoutes = xml::read_from_str(xml)?;
    RouteFile::try_from(io_routes)
}

pub(crate) fn to_xml_string(routes: &RouteFile) -> Result<String> {
    xml::write_to_string(&IORoutes::from(routes), xml::XML_HEADER)
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename = "routes")]
pub struct IORoutes {
    #[serde(rename = "@xmlns:xsi", skip_serializing_if = "Option::is_none")]
    pub xmlns_xsi: Option<String>,
    #[serde(
        rename = "@xsi:noNamespaceSchemaLocation",
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_location: Option<String>,
    #[serde(rename = "$value", default)]
    pub entries: Vec<IORouteEntry>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum IORouteEntry {
    #[serde(rename = "vType")]
    VehicleType(IOVehicleType),
    #[serde(rename = "trip")]
    Trip(IOTrip),
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOVehicleType {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@vClass", skip_serializing_if = "Option::is_none")]
    pub v_class: Option<String>,
    #[serde(rename = "@guiShape", skip_serializing_if = "Option::is_none")]
    pub gui_shape: Option<String>,
    #[serde(rename = "@color", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "@maxSpeed", skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    #[serde(rename = "@accel", skip_serializing_if = "Option::is_none")]
    pub accel: Option<f64>,
    #[serde(rename = "@decel", skip_serializing_if = "Option::is_none")]
    pub decel: Option<f64>,
    #[serde(rename = "@sigma", skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f64>,
    #[serde(rename = "@tau", skip_serializing_if = "Option::is_none")]
    pub tau: Option<f64>,
    #[serde(rename = "@speedFactor", skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f64>,
    #[serde(rename = "@speedDev", skip_serializing_if = "Option::is_none")]
    pub speed_dev: Option<f64>,
    #[serde(rename = "@congestionThreshold", skip_serializing_if = "Option::is_none")]
    pub congestion_threshold: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOTrip {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub vehicle_type: String,
    #[serde(rename = "@depart")]
    pub depart: f64,
    #[serde(rename = "@departLane", skip_serializing_if = "Option::is_none")]
    pub depart_lane: Option<String>,
    #[serde(rename = "@departPos", skip_serializing_if = "Option::is_none")]
    pub depart_pos: Option<String>,
    #[serde(rename = "@departSpeed", skip_serializing_if = "Option::is_none")]
    pub depart_speed: Option<String>,
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(rename = "param", default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}

impl TryFrom<IOVehicleType> for VehicleType {
    type Error = crate::error::Error;

    fn try_from(io: IOVehicleType) -> Result<Self> {
        Ok(VehicleType {
            id: io.id,
            class: io.v_class.as_deref().map(VehicleClass::from),
            gui_shape: io.gui_shape,
            color: io
                .color
                .as_deref()
                .map(str::parse::<Color>)
                .transpose()?,
            kinematics: Kinematics {
                max_speed: io.max_speed,
                accel: io.accel,
                decel: io.decel,
                sigma: io.sigma,
                tau: io.tau,
                speed_factor: io.speed_factor,
                speed_dev: io.speed_dev,
                congestion_threshold: io.congestion_threshold,
            },
        })
    }
}

impl From<&VehicleType> for IOVehicleType {
    fn from(t: &VehicleType) -> Self {
        IOVehicleType {
            id: t.id.clone(),
            v_class: t.class.as_ref().map(|c| c.to_string()),
            gui_shape: t.gui_shape.clone(),
            color: t.color.as_ref().map(|c| c.to_string()),
            max_speed: t.kinematics.max_speed,
            accel: t.kinematics.accel,
            decel: t.kinematics.decel,
            sigma: t.kinematics.sigma,
            tau: t.kinematics.tau,
            speed_factor: t.kinematics.speed_factor,
            speed_dev: t.kinematics.speed_dev,
            congestion_threshold: t.kinematics.congestion_threshold,
        }
    }
}

impl TryFrom<IOTrip> for Trip {
    type Error = crate::error::Error;

    fn try_from(io: IOTrip) -> Result<Self> {
        Ok(Trip {
            id: io.id,
            vehicle_type: io.vehicle_type,
            depart: io.depart,
            depart_lane: io
                .depart_lane
                .as_deref()
                .map(str::parse::<DepartLane>)
                .transpose()?,
            depart_pos: io
                .depart_pos
                .as_deref()
                .map(str::parse::<DepartPos>)
                .transpose()?,
            depart_speed: io
                .depart_speed
                .as_deref()
                .map(str::parse::<DepartSpeed>)
                .transpose()?,
            from: io.from,
            to: io.to,
            params: io.params.into(),
        })
    }
}

impl From<&Trip> for IOTrip {
    fn from(t: &Trip) -> Self {
        IOTrip {
            id: t.id.clone(),
            vehicle_type: t.vehicle_type.clone(),
            depart: t.depart,
            depart_lane: t.depart_lane.map(|l| l.to_string()),
            depart_pos: t.depart_pos.map(|p| p.to_string()),
            depart_speed: t.depart_speed.map(|s| s.to_string()),
            from: t.from.clone(),
            to: t.to.clone(),
            params: t.params.iter().cloned().collect(),
        }
    }
}

impl TryFrom<IORoutes> for RouteFile {
    type Error = crate::error::Error;

    fn try_from(io: IORoutes) -> Result<Self> {
        let mut routes = RouteFile::new();
        for entry in io.entries {
            match entry {
                IORouteEntry::VehicleType(t) => routes.push_vehicle_type(t.try_into()?),
                IORouteEntry::Trip(t) => routes.push_trip(t.try_into()?),
            }
        }
        Ok(routes)
    }
}

impl From<&RouteFile> for IORoutes {
    fn from(routes: &RouteFile) -> Self {
        let entries = routes
            .entries()
            .iter()
            .map(|e| match e {
                RouteEntry::VehicleType(t) => IORouteEntry::VehicleType(t.into()),
                RouteEntry::Trip(t) => IORouteEntry::Trip(t.into()),
            })
            .collect();
        IORoutes {
            xmlns_xsi: Some(XSI_NAMESPACE.to_string()),
            schema_location: Some(SCHEMA_LOCATION.to_string()),
            entries,
        }
    }
}
