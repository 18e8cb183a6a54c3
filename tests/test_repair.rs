use std::fs;
use std::path::{Path, PathBuf};

use sumo_emergency::config::{Config, Repair};
use sumo_emergency::error::Error;
use sumo_emergency::network::Network;
use sumo_emergency::repair::{backup_path, repair_file, Endpoint};
use sumo_emergency::routes::validation::validate_against_network;
use sumo_emergency::routes::RouteFile;

const RESOURCES: &str = "./tests/resources/repair";

/// Copies the repair fixtures into a fresh directory, so that tests can rewrite them.
fn prepare(dir: &Path) {
    for file in ["grid.net.xml", "broken_routes.rou.xml", "config.yml"] {
        fs::copy(PathBuf::from(RESOURCES).join(file), dir.join(file)).unwrap();
    }
}

#[test]
fn repair_with_config() {
    let dir = tempfile::tempdir().unwrap();
    prepare(dir.path());
    let config = Config::from_file(&dir.path().join("config.yml")).unwrap();
    let routes_path = config.routes().unwrap();
    let network_path = config.network().unwrap();
    let original = fs::read_to_string(&routes_path).unwrap();

    let report = repair_file(&routes_path, &network_path, &config.repair()).unwrap();

    assert_eq!(4, report.fixed_count());
    let fixed: Vec<_> = report
        .fixes
        .iter()
        .map(|f| (f.trip.as_str(), f.endpoint, f.old_edge.as_str()))
        .collect();
    assert_eq!(
        vec![
            ("ambulance_1", Endpoint::From, "removed_edge"),
            ("ambulance_2", Endpoint::From, "removed_edge"),
            ("ambulance_2", Endpoint::To, "also_removed"),
            ("ambulance_3", Endpoint::From, ":J1_0"),
        ],
        fixed
    );
    assert!(report.fixes.iter().all(|f| f.new_edge == "420496529#1"));

    // the backup keeps the file as it was before the repair
    let backup = report.backup.unwrap();
    assert_eq!(backup_path(&routes_path), backup);
    assert_eq!(original, fs::read_to_string(&backup).unwrap());

    let repaired = RouteFile::from_file(&routes_path).unwrap();
    let network = Network::from_file(&network_path).unwrap();
    assert!(validate_against_network(&repaired, &network).is_valid());
    assert_eq!("north_in", repaired.trip("ambulance_3").unwrap().to);
}

#[test]
fn repair_twice_keeps_first_backup() {
    let dir = tempfile::tempdir().unwrap();
    prepare(dir.path());
    let routes_path = dir.path().join("broken_routes.rou.xml");
    let network_path = dir.path().join("grid.net.xml");
    let original = fs::read_to_string(&routes_path).unwrap();

    let first = repair_file(&routes_path, &network_path, &Repair::default()).unwrap();
    let second = repair_file(&routes_path, &network_path, &Repair::default()).unwrap();

    assert_eq!(4, first.fixed_count());
    assert!(first.backup.is_some());
    assert_eq!(0, second.fixed_count());
    assert_eq!(None, second.backup);
    assert_eq!(
        original,
        fs::read_to_string(backup_path(&routes_path)).unwrap()
    );
}

#[test]
fn unreadable_network_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    prepare(dir.path());
    let routes_path = dir.path().join("broken_routes.rou.xml");
    let network_path = dir.path().join("broken.net.xml");
    fs::write(&network_path, "<net><edge id=\"unterminated\"").unwrap();
    let config = Repair {
        fallback_edge: String::from("fallback"),
        backup: false,
    };

    let report = repair_file(&routes_path, &network_path, &config).unwrap();

    // without a network, no edge is known to be valid
    assert_eq!(8, report.fixed_count());
    assert_eq!(None, report.backup);
    assert!(!backup_path(&routes_path).exists());
    let repaired = RouteFile::from_file(&routes_path).unwrap();
    assert!(repaired
        .trips()
        .all(|t| t.from == "fallback" && t.to == "fallback"));
}

#[test]
fn missing_input() {
    let dir = tempfile::tempdir().unwrap();
    prepare(dir.path());

    let result = repair_file(
        &dir.path().join("broken_routes.rou.xml"),
        &dir.path().join("osm.net.xml.gz"),
        &Repair::default(),
    );

    assert!(matches!(result, Err(Error::MissingInput(path)) if path.ends_with("osm.net.xml.gz")));
}
