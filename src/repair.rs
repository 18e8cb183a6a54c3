//! Rewrites trips whose origin or destination is not part of the road network.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::HashSet;
use tracing::{info, warn};

use crate::config::Repair;
use crate::error::{Error, Result};
use crate::network::Network;
use crate::routes::RouteFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFix {
    pub trip: String,
    pub endpoint: Endpoint,
    pub old_edge: String,
    pub new_edge: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepairReport {
    pub fixes: Vec<EdgeFix>,
    pub backup: Option<PathBuf>,
}

impl RepairReport {
    /// Number of replaced endpoints. A trip with an invalid origin and destination counts twice.
    pub fn fixed_count(&self) -> usize {
        self.fixes.len()
    }
}

pub struct RouteRepairer {
    valid_edges: HashSet<String>,
    replacement: String,
}

impl RouteRepairer {
    /// Uses the first edge of `valid_edges` as replacement, or `fallback` if there is none.
    pub fn new(valid_edges: Vec<String>, fallback: &str) -> Self {
        let replacement = match valid_edges.first() {
            Some(edge) => {
                info!("Found {} valid edges in the network", valid_edges.len());
                edge.clone()
            }
            None => {
                warn!("No valid edges found in the network!");
                fallback.to_string()
            }
        };
        info!("Using {replacement} as a replacement for invalid edges");
        RouteRepairer {
            valid_edges: valid_edges.into_iter().collect(),
            replacement,
        }
    }

    pub fn from_network(network: &Network, fallback: &str) -> Self {
        Self::new(network.edge_ids().map(str::to_string).collect(), fallback)
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn repair(&self, routes: &mut RouteFile) -> Vec<EdgeFix> {
        let mut fixes = Vec::new();
        for trip in routes.trips_mut() {
            if !self.valid_edges.contains(&trip.from) {
                info!(
                    "Fixing route for {}: replacing 'from' edge {} with {}",
                    trip.id, trip.from, self.replacement
                );
                let old_edge = std::mem::replace(&mut trip.from, self.replacement.clone());
                fixes.push(EdgeFix {
                    trip: trip.id.clone(),
                    endpoint: Endpoint::From,
                    old_edge,
                    new_edge: self.replacement.clone(),
                });
            }
            if !self.valid_edges.contains(&trip.to) {
                info!(
                    "Fixing route for {}: replacing 'to' edge {} with {}",
                    trip.id, trip.to, self.replacement
                );
                let old_edge = std::mem::replace(&mut trip.to, self.replacement.clone());
                fixes.push(EdgeFix {
                    trip: trip.id.clone(),
                    endpoint: Endpoint::To,
                    old_edge,
                    new_edge: self.replacement.clone(),
                });
            }
        }
        fixes
    }
}

pub fn backup_path(routes_path: &Path) -> PathBuf {
    let mut name = routes_path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Repairs the route file at `routes_path` in place. A network that cannot be read is not fatal:
/// every edge is then replaced with the configured fallback edge.
pub fn repair_file(
    routes_path: &Path,
    network_path: &Path,
    config: &Repair,
) -> Result<RepairReport> {
    for path in [routes_path, network_path] {
        if !path.exists() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
    }

    let repairer = match Network::from_file(network_path) {
        Ok(network) => RouteRepairer::from_network(&network, &config.fallback_edge),
        Err(e) => {
            warn!("Error reading network file: {e}");
            RouteRepairer::new(Vec::new(), &config.fallback_edge)
        }
    };

    let mut routes = RouteFile::from_file(routes_path)?;

    let mut report = RepairReport::default();
    if config.backup {
        let backup = backup_path(routes_path);
        if !backup.exists() {
            fs::copy(routes_path, &backup).map_err(|e| Error::io(&backup, e))?;
            info!("Created backup at {backup:?}");
            report.backup = Some(backup);
        }
    }

    report.fixes = repairer.repair(&mut routes);
    routes.to_file(routes_path)?;
    info!(
        "Fixed {} invalid edges in {routes_path:?}",
        report.fixed_count()
    );
    Ok(report)
}
