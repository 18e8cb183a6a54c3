use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;

use crate::error::{Error, Result};

/// Abstract vehicle class as understood by SUMO's `vClass` attribute. Only the classes relevant
/// for emergency scenarios get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Emergency,
    Authority,
    Army,
    Passenger,
    Bus,
    Truck,
    Delivery,
    Other(String),
}

impl VehicleClass {
    pub fn as_str(&self) -> &str {
        match self {
            VehicleClass::Emergency => "emergency",
            VehicleClass::Authority => "authority",
            VehicleClass::Army => "army",
            VehicleClass::Passenger => "passenger",
            VehicleClass::Bus => "bus",
            VehicleClass::Truck => "truck",
            VehicleClass::Delivery => "delivery",
            VehicleClass::Other(s) => s.as_str(),
        }
    }

    /// Classes which may claim right of way at signalized junctions.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            VehicleClass::Emergency | VehicleClass::Authority | VehicleClass::Army
        )
    }
}

impl From<&str> for VehicleClass {
    fn from(value: &str) -> Self {
        match value {
            "emergency" => VehicleClass::Emergency,
            "authority" => VehicleClass::Authority,
            "army" => VehicleClass::Army,
            "passenger" => VehicleClass::Passenger,
            "bus" => VehicleClass::Bus,
            "truck" => VehicleClass::Truck,
            "delivery" => VehicleClass::Delivery,
            other => VehicleClass::Other(other.to_string()),
        }
    }
}

impl Display for VehicleClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display color of a vehicle type. SUMO accepts comma separated components either as floats in
/// `[0, 1]` or as integers in `[0, 255]`, as well as color names.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    Rgba {
        r: f64,
        g: f64,
        b: f64,
        a: Option<f64>,
    },
    Named(String),
}

impl Color {
    /// Components normalized to `[0, 1]`. Named colors have no components.
    pub fn normalized(&self) -> Option<[f64; 4]> {
        match self {
            Color::Rgba { r, g, b, a } => {
                let components = [*r, *g, *b, a.unwrap_or(1.)];
                let scale = if components.iter().any(|c| *c > 1.) {
                    255.
                } else {
                    1.
                };
                Some(components.map(|c| c / scale))
            }
            Color::Named(_) => None,
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !s.contains(',') {
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::invalid("color", s));
            }
            return Ok(Color::Named(s.to_string()));
        }

        let components: Vec<f64> = s
            .split(',')
            .map(|c| c.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| Error::invalid("color", s))?;

        if components.iter().any(|c| *c < 0. || *c > 255.) {
            return Err(Error::invalid("color", s));
        }

        match components.as_slice() {
            [r, g, b] => Ok(Color::Rgba {
                r: *r,
                g: *g,
                b: *b,
                a: None,
            }),
            [r, g, b, a] => Ok(Color::Rgba {
                r: *r,
                g: *g,
                b: *b,
                a: Some(*a),
            }),
            _ => Err(Error::invalid("color", s)),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Rgba { r, g, b, a } => {
                let joined = [Some(*r), Some(*g), Some(*b), *a].into_iter().flatten().join(",");
                f.write_str(&joined)
            }
            Color::Named(name) => f.write_str(name),
        }
    }
}

/// Lane on which a trip is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartLane {
    Random,
    Free,
    Allowed,
    #[default]
    Best,
    First,
    Index(u32),
}

impl FromStr for DepartLane {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(DepartLane::Random),
            "free" => Ok(DepartLane::Free),
            "allowed" => Ok(DepartLane::Allowed),
            "best" => Ok(DepartLane::Best),
            "first" => Ok(DepartLane::First),
            other => other
                .parse::<u32>()
                .map(DepartLane::Index)
                .map_err(|_| Error::invalid("departLane", other)),
        }
    }
}

impl Display for DepartLane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartLane::Random => f.write_str("random"),
            DepartLane::Free => f.write_str("free"),
            DepartLane::Allowed => f.write_str("allowed"),
            DepartLane::Best => f.write_str("best"),
            DepartLane::First => f.write_str("first"),
            DepartLane::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Position on the departure lane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DepartPos {
    Random,
    Free,
    RandomFree,
    #[default]
    Base,
    Last,
    Meters(f64),
}

impl FromStr for DepartPos {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(DepartPos::Random),
            "free" => Ok(DepartPos::Free),
            "random_free" => Ok(DepartPos::RandomFree),
            "base" => Ok(DepartPos::Base),
            "last" => Ok(DepartPos::Last),
            other => other
                .parse::<f64>()
                .map(DepartPos::Meters)
                .map_err(|_| Error::invalid("departPos", other)),
        }
    }
}

impl Display for DepartPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartPos::Random => f.write_str("random"),
            DepartPos::Free => f.write_str("free"),
            DepartPos::RandomFree => f.write_str("random_free"),
            DepartPos::Base => f.write_str("base"),
            DepartPos::Last => f.write_str("last"),
            DepartPos::Meters(m) => write!(f, "{m}"),
        }
    }
}

/// Speed with which a trip is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DepartSpeed {
    Random,
    Max,
    Desired,
    SpeedLimit,
    MetersPerSecond(f64),
    #[default]
    Zero,
}

impl FromStr for DepartSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(DepartSpeed::Random),
            "max" => Ok(DepartSpeed::Max),
            "desired" => Ok(DepartSpeed::Desired),
            "speedLimit" => Ok(DepartSpeed::SpeedLimit),
            other => {
                let speed = other
                    .parse::<f64>()
                    .map_err(|_| Error::invalid("departSpeed", other))?;
                if speed == 0. {
                    Ok(DepartSpeed::Zero)
                } else {
                    Ok(DepartSpeed::MetersPerSecond(speed))
                }
            }
        }
    }
}

impl Display for DepartSpeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DepartSpeed::Random => f.write_str("random"),
            DepartSpeed::Max => f.write_str("max"),
            DepartSpeed::Desired => f.write_str("desired"),
            DepartSpeed::SpeedLimit => f.write_str("speedLimit"),
            DepartSpeed::MetersPerSecond(v) => write!(f, "{v}"),
            DepartSpeed::Zero => f.write_str("0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::routes::attributes::{Color, DepartLane, DepartPos, DepartSpeed, VehicleClass};

    #[test]
    fn parse_colors() {
        assert_eq!(
            Color::Rgba {
                r: 1.,
                g: 0.,
                b: 0.,
                a: None
            },
            "1,0,0".parse().unwrap()
        );
        assert_eq!(Color::Named(String::from("blue")), "blue".parse().unwrap());

        let byte_color: Color = "255, 128, 0, 255".parse().unwrap();
        let normalized = byte_color.normalized().unwrap();
        assert_eq!(1., normalized[0]);
        assert!((normalized[1] - 128. / 255.).abs() < 1e-9);
        assert_eq!("255,128,0,255", byte_color.to_string());

        assert!("1,0".parse::<Color>().is_err());
        assert!("1,0,300".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
    }

    #[test]
    fn parse_depart_policies() {
        assert_eq!(DepartLane::Best, "best".parse().unwrap());
        assert_eq!(DepartLane::Index(2), "2".parse().unwrap());
        assert!("left".parse::<DepartLane>().is_err());

        assert_eq!(DepartPos::RandomFree, "random_free".parse().unwrap());
        assert_eq!(DepartPos::Meters(12.5), "12.5".parse().unwrap());

        assert_eq!(DepartSpeed::Max, "max".parse().unwrap());
        assert_eq!(DepartSpeed::Zero, "0".parse().unwrap());
        assert_eq!("speedLimit", DepartSpeed::SpeedLimit.to_string());
    }

    #[test]
    fn vehicle_classes() {
        assert_eq!(VehicleClass::Emergency, VehicleClass::from("emergency"));
        assert!(VehicleClass::from("authority").is_privileged());
        assert!(!VehicleClass::from("passenger").is_privileged());
        assert_eq!("tram", VehicleClass::from("tram").to_string());
    }
}
