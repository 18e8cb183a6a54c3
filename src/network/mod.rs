use std::path::Path;

use ahash::HashMap;
use tracing::{info, warn};

use crate::error::Result;
use crate::io::xml;
use crate::network::io::IONetwork;

pub mod io;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: String,
    pub index: usize,
    pub speed: f64,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub lanes: Vec<Lane>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub id: String,
    pub junction_type: String,
    pub position: Position,
    pub incoming_lanes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub duration: f64,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficLightProgram {
    pub tls_id: String,
    pub program_id: String,
    pub offset: f64,
    pub phases: Vec<Phase>,
}

/// A single signal-controlled movement: from an incoming lane through an optional internal lane
/// to an outgoing lane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlledLink {
    pub incoming_lane: String,
    pub outgoing_lane: String,
    pub via_lane: Option<String>,
}

impl ControlledLink {
    pub fn new(incoming_lane: &str, outgoing_lane: &str, via_lane: Option<&str>) -> Self {
        ControlledLink {
            incoming_lane: incoming_lane.to_string(),
            outgoing_lane: outgoing_lane.to_string(),
            via_lane: via_lane.map(str::to_string),
        }
    }

    pub fn incoming_edge(&self) -> &str {
        edge_of_lane(&self.incoming_lane)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub from_lane: usize,
    pub to_lane: usize,
    pub via: Option<String>,
    pub tl: Option<String>,
    pub link_index: Option<usize>,
}

/// Edge id of a lane id. SUMO names lanes `<edge>_<index>`, and edge ids may contain
/// underscores themselves.
pub fn edge_of_lane(lane_id: &str) -> &str {
    match lane_id.rsplit_once('_') {
        Some((edge, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => {
            edge
        }
        _ => lane_id,
    }
}

pub fn is_internal_edge(edge_id: &str) -> bool {
    edge_id.starts_with(':')
}

/// Read-only view on a SUMO road network. Internal edges (inside junctions) are kept apart from
/// normal edges, so that [Network::edge_ids] only yields edges trips may start or end on.
#[derive(Debug, Default)]
pub struct Network {
    edges: Vec<Edge>,
    edge_index: HashMap<String, usize>,
    internal_edges: Vec<Edge>,
    junctions: HashMap<String, Junction>,
    programs: Vec<TrafficLightProgram>,
    connections: Vec<Connection>,
}

impl Network {
    pub fn from_file(path: &Path) -> Result<Self> {
        let io_net: IONetwork = xml::read_from_file(path)?;
        let network = Network::from(io_net);
        info!(
            "Loaded network with {} edges, {} junctions and {} traffic lights from {path:?}",
            network.edges.len(),
            network.junctions.len(),
            network.tls_ids().len()
        );
        Ok(network)
    }

    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let io_net: IONetwork = xml::read_from_str(xml)?;
        Ok(Network::from(io_net))
    }

    pub fn add_edge(&mut self, edge: Edge) {
        if is_internal_edge(&edge.id) {
            self.internal_edges.push(edge);
        } else {
            self.edge_index.insert(edge.id.clone(), self.edges.len());
            self.edges.push(edge);
        }
    }

    pub fn add_junction(&mut self, junction: Junction) {
        self.junctions.insert(junction.id.clone(), junction);
    }

    pub fn add_program(&mut self, program: TrafficLightProgram) {
        self.programs.push(program);
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn internal_edges(&self) -> &[Edge] {
        &self.internal_edges
    }

    /// Ids of all normal edges in file order.
    pub fn edge_ids(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|e| e.id.as_str())
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index.get(id).map(|i| &self.edges[*i])
    }

    pub fn junction(&self, id: &str) -> Option<&Junction> {
        self.junctions.get(id)
    }

    pub fn programs(&self, tls_id: &str) -> impl Iterator<Item = &TrafficLightProgram> {
        let tls_id = tls_id.to_string();
        self.programs.iter().filter(move |p| p.tls_id == tls_id)
    }

    /// Ids of all signals, sorted.
    pub fn tls_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.programs.iter().map(|p| p.tls_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Links controlled by `tls_id`, indexed by their link index. Several connections may share
    /// one link index. Link indices beyond the signal state of the programs of `tls_id` are
    /// skipped.
    pub fn controlled_links(&self, tls_id: &str) -> Vec<Vec<ControlledLink>> {
        let num_links = self
            .programs(tls_id)
            .flat_map(|p| p.phases.iter())
            .map(|phase| phase.state.chars().count())
            .max()
            .unwrap_or(0);

        let mut result: Vec<Vec<ControlledLink>> = Vec::new();
        for connection in &self.connections {
            let (Some(tl), Some(index)) = (&connection.tl, connection.link_index) else {
                continue;
            };
            if tl != tls_id {
                continue;
            }
            if index >= num_links {
                warn!(
                    "Skipping connection {} -> {}: link index {index} exceeds {num_links} links of {tls_id}",
                    connection.from, connection.to
                );
                continue;
            }
            if result.len() <= index {
                result.resize(index + 1, Vec::new());
            }
            result[index].push(ControlledLink {
                incoming_lane: format!("{}_{}", connection.from, connection.from_lane),
                outgoing_lane: format!("{}_{}", connection.to, connection.to_lane),
                via_lane: connection.via.clone(),
            });
        }
        result
    }
}

impl From<IONetwork> for Network {
    fn from(io_net: IONetwork) -> Self {
        let mut network = Network::default();

        for io_edge in io_net.edges {
            // SUMO marks internal edges both by function and by a leading ':'
            let internal = io_edge.function.as_deref() == Some("internal");
            let lanes = io_edge
                .lanes
                .into_iter()
                .map(|l| Lane {
                    id: l.id,
                    index: l.index,
                    speed: l.speed,
                    length: l.length,
                })
                .collect();
            let edge = Edge {
                id: io_edge.id,
                from: io_edge.from,
                to: io_edge.to,
                lanes,
            };
            if internal {
                network.internal_edges.push(edge);
            } else {
                network.add_edge(edge);
            }
        }

        for io_junction in io_net.junctions {
            network.add_junction(Junction {
                id: io_junction.id,
                junction_type: io_junction.junction_type,
                position: Position::new(io_junction.x, io_junction.y),
                incoming_lanes: io_junction
                    .inc_lanes
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            });
        }

        for io_logic in io_net.tl_logics {
            network.add_program(TrafficLightProgram {
                tls_id: io_logic.id,
                program_id: io_logic.program_id,
                offset: io_logic.offset,
                phases: io_logic
                    .phases
                    .into_iter()
                    .map(|p| Phase {
                        duration: p.duration,
                        state: p.state,
                    })
                    .collect(),
            });
        }

        for c in io_net.connections {
            network.add_connection(Connection {
                from: c.from,
                to: c.to,
                from_lane: c.from_lane,
                to_lane: c.to_lane,
                via: c.via,
                tl: c.tl,
                link_index: c.link_index,
            });
        }

        network
    }
}

#[cfg(test)]
mod tests {
    use crate::network::{edge_of_lane, ControlledLink, Network, Position};

    const NET: &str = "<net version=\"1.9\">
            <edge id=\":J1_0\" function=\"internal\">
                <lane id=\":J1_0_0\" index=\"0\" speed=\"13.89\" length=\"5.00\"/>
            </edge>
            <edge id=\"E0\" from=\"J0\" to=\"J1\">
                <lane id=\"E0_0\" index=\"0\" speed=\"13.89\" length=\"100.00\"/>
                <lane id=\"E0_1\" index=\"1\" speed=\"13.89\" length=\"100.00\"/>
            </edge>
            <edge id=\"E1\" from=\"J1\" to=\"J2\">
                <lane id=\"E1_0\" index=\"0\" speed=\"13.89\" length=\"100.00\"/>
            </edge>
            <edge id=\"side_road\" from=\"J3\" to=\"J1\">
                <lane id=\"side_road_0\" index=\"0\" speed=\"8.33\" length=\"50.00\"/>
            </edge>
            <tlLogic id=\"J1\" type=\"static\" programID=\"0\" offset=\"0\">
                <phase duration=\"30\" state=\"GGr\"/>
                <phase duration=\"30\" state=\"rrG\"/>
            </tlLogic>
            <junction id=\"J1\" type=\"traffic_light\" x=\"100.00\" y=\"0.00\" incLanes=\"E0_0 E0_1 side_road_0\"/>
            <connection from=\"E0\" to=\"E1\" fromLane=\"0\" toLane=\"0\" via=\":J1_0_0\" tl=\"J1\" linkIndex=\"0\" dir=\"s\"/>
            <connection from=\"E0\" to=\"E1\" fromLane=\"1\" toLane=\"0\" via=\":J1_1_0\" tl=\"J1\" linkIndex=\"1\" dir=\"s\"/>
            <connection from=\"side_road\" to=\"E1\" fromLane=\"0\" toLane=\"0\" tl=\"J1\" linkIndex=\"2\" dir=\"r\"/>
            <connection from=\":J1_0\" to=\"E1\" fromLane=\"0\" toLane=\"0\" dir=\"s\"/>
        </net>";

    #[test]
    fn normal_and_internal_edges() {
        let net = Network::from_xml_str(NET).unwrap();

        let ids: Vec<_> = net.edge_ids().collect();
        assert_eq!(vec!["E0", "E1", "side_road"], ids);
        assert!(net.has_edge("E0"));
        assert!(!net.has_edge(":J1_0"));
        assert_eq!(1, net.internal_edges().len());
        assert_eq!(2, net.edge("E0").unwrap().lanes.len());
    }

    #[test]
    fn junctions_and_programs() {
        let net = Network::from_xml_str(NET).unwrap();

        let junction = net.junction("J1").unwrap();
        assert_eq!(Position::new(100., 0.), junction.position);
        assert_eq!(3, junction.incoming_lanes.len());
        assert_eq!(vec!["J1"], net.tls_ids());
        assert_eq!(2, net.programs("J1").next().unwrap().phases.len());
    }

    #[test]
    fn controlled_links_by_index() {
        let net = Network::from_xml_str(NET).unwrap();
        let links = net.controlled_links("J1");

        assert_eq!(3, links.len());
        assert_eq!(
            ControlledLink::new("E0_1", "E1_0", Some(":J1_1_0")),
            links[1][0]
        );
        assert_eq!("side_road", links[2][0].incoming_edge());
        assert!(net.controlled_links("unknown").is_empty());
    }

    #[test]
    fn link_index_beyond_signal_state_is_skipped() {
        let xml = NET.replace("linkIndex=\"2\"", "linkIndex=\"4000000000\"");
        let net = Network::from_xml_str(&xml).unwrap();
        let links = net.controlled_links("J1");

        assert_eq!(2, links.len());
        assert!(links
            .iter()
            .flatten()
            .all(|l| l.incoming_edge() != "side_road"));
    }

    #[test]
    fn lane_to_edge() {
        assert_eq!("E0", edge_of_lane("E0_1"));
        assert_eq!("side_road", edge_of_lane("side_road_0"));
        assert_eq!("420496529#1", edge_of_lane("420496529#1_2"));
        assert_eq!(":J1_0", edge_of_lane(":J1_0_0"));
        assert_eq!("no-index", edge_of_lane("no-index"));
    }

    #[test]
    fn distance() {
        assert_eq!(5., Position::new(0., 0.).distance(&Position::new(3., 4.)));
    }
}
