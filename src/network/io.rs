use serde::{Deserialize, Serialize};

use crate::io::params::Param;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(rename = "net")]
pub struct IONetwork {
    #[serde(rename = "@version", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "edge", default)]
    pub edges: Vec<IOEdge>,
    #[serde(rename = "tlLogic", default)]
    pub tl_logics: Vec<IOTlLogic>,
    #[serde(rename = "junction", default)]
    pub junctions: Vec<IOJunction>,
    #[serde(rename = "connection", default)]
    pub connections: Vec<IOConnection>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOEdge {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@from", skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(rename = "@to", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(rename = "@function", skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(rename = "lane", default)]
    pub lanes: Vec<IOLane>,
    #[serde(rename = "param", default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOLane {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@index")]
    pub index: usize,
    #[serde(rename = "@speed")]
    pub speed: f64,
    #[serde(rename = "@length")]
    pub length: f64,
    #[serde(rename = "@allow", skip_serializing_if = "Option::is_none")]
    pub allow: Option<String>,
    #[serde(rename = "@disallow", skip_serializing_if = "Option::is_none")]
    pub disallow: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOTlLogic {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub logic_type: Option<String>,
    #[serde(rename = "@programID")]
    pub program_id: String,
    #[serde(rename = "@offset", default)]
    pub offset: f64,
    #[serde(rename = "phase", default)]
    pub phases: Vec<IOPhase>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOPhase {
    #[serde(rename = "@duration")]
    pub duration: f64,
    #[serde(rename = "@state")]
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOJunction {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub junction_type: String,
    #[serde(rename = "@x")]
    pub x: f64,
    #[serde(rename = "@y")]
    pub y: f64,
    #[serde(rename = "@incLanes", default)]
    pub inc_lanes: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOConnection {
    #[serde(rename = "@from")]
    pub from: String,
    #[serde(rename = "@to")]
    pub to: String,
    #[serde(rename = "@fromLane")]
    pub from_lane: usize,
    #[serde(rename = "@toLane")]
    pub to_lane: usize,
    #[serde(rename = "@via", skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(rename = "@tl", skip_serializing_if = "Option::is_none")]
    pub tl: Option<String>,
    #[serde(rename = "@linkIndex", skip_serializing_if = "Option::is_none")]
    pub link_index: Option<usize>,
    #[serde(rename = "@dir", skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}
