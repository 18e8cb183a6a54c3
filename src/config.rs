use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::{Error, Result};
use crate::io::resolve_path;

pub const DEFAULT_FALLBACK_EDGE: &str = "420496529#1";
pub const DEFAULT_DETECTION_RADIUS: f64 = 50.0;
pub const DEFAULT_NORMAL_TYPE: &str = "veh_passenger";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub modules: Modules,
    /// Location the config was loaded from. Relative input paths are resolved against it.
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Modules {
    #[serde(default)]
    pub routes: Option<PathBuf>,
    #[serde(default)]
    pub network: Option<PathBuf>,
    #[serde(default)]
    pub repair: Option<Repair>,
    #[serde(default)]
    pub preemption: Option<Preemption>,
    #[serde(default)]
    pub output: Option<Output>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path).map_err(|e| Error::io(path, e))?);
        let mut config: Config = serde_yaml::from_reader(reader).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config at {path:?}. Original error was: {e}"
            ))
        })?;
        config.source = Some(path.to_path_buf());
        config.preemption().check()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.preemption().check()?;
        Ok(config)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        match &self.source {
            Some(source) => resolve_path(source, file),
            None => file.to_path_buf(),
        }
    }

    pub fn routes(&self) -> Option<PathBuf> {
        self.modules.routes.as_deref().map(|p| self.resolve(p))
    }

    pub fn network(&self) -> Option<PathBuf> {
        self.modules.network.as_deref().map(|p| self.resolve(p))
    }

    pub fn repair(&self) -> Repair {
        self.modules.repair.clone().unwrap_or_default()
    }

    pub fn preemption(&self) -> Preemption {
        self.modules.preemption.clone().unwrap_or_default()
    }

    pub fn output(&self) -> Output {
        self.modules.output.clone().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Repair {
    #[serde(default = "default_fallback_edge")]
    pub fallback_edge: String,
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Default for Repair {
    fn default() -> Self {
        Repair {
            fallback_edge: default_fallback_edge(),
            backup: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Preemption {
    #[serde(default = "default_detection_radius")]
    pub detection_radius: f64,
    #[serde(default = "default_normal_type")]
    pub normal_type: String,
    /// Vehicle type id to priority. Lower numbers win. 0 is reserved for normal traffic.
    #[serde(default = "default_priorities")]
    pub priorities: BTreeMap<String, u32>,
}

impl Preemption {
    pub fn check(&self) -> Result<()> {
        if self.detection_radius <= 0. || self.detection_radius.is_nan() {
            return Err(Error::Config(format!(
                "detection_radius must be positive, was {}",
                self.detection_radius
            )));
        }
        if let Some((vehicle_type, _)) = self.priorities.iter().find(|(_, p)| **p == 0) {
            return Err(Error::Config(format!(
                "priority 0 is reserved for normal traffic, but was assigned to {vehicle_type}"
            )));
        }
        if self.priorities.contains_key(&self.normal_type) {
            return Err(Error::Config(format!(
                "normal type {} must not have an emergency priority",
                self.normal_type
            )));
        }
        Ok(())
    }
}

impl Default for Preemption {
    fn default() -> Self {
        Preemption {
            detection_radius: default_detection_radius(),
            normal_type: default_normal_type(),
            priorities: default_priorities(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Output {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: PathBuf::from("./"),
            logging: Logging::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Logging {
    None,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<Logging> for LevelFilter {
    fn from(logging: Logging) -> Self {
        match logging {
            Logging::None => LevelFilter::OFF,
            Logging::Error => LevelFilter::ERROR,
            Logging::Warn => LevelFilter::WARN,
            Logging::Info => LevelFilter::INFO,
            Logging::Debug => LevelFilter::DEBUG,
            Logging::Trace => LevelFilter::TRACE,
        }
    }
}

fn default_fallback_edge() -> String {
    String::from(DEFAULT_FALLBACK_EDGE)
}

fn default_true() -> bool {
    true
}

fn default_detection_radius() -> f64 {
    DEFAULT_DETECTION_RADIUS
}

fn default_normal_type() -> String {
    String::from(DEFAULT_NORMAL_TYPE)
}

fn default_priorities() -> BTreeMap<String, u32> {
    BTreeMap::from([
        (String::from("veh_ambulance"), 1),
        (String::from("veh_firefighter"), 2),
        (String::from("veh_police"), 3),
    ])
}
