use std::path::PathBuf;

use assert_approx_eq::assert_approx_eq;

use sumo_emergency::config::Config;
use sumo_emergency::network::{Network, Position};
use sumo_emergency::preemption::{PreemptionController, TrafficControl};
use sumo_emergency::test_utils::{Command, InMemoryControl, SimVehicle};

fn controller() -> PreemptionController<InMemoryControl> {
    let network =
        Network::from_file(&PathBuf::from("./tests/resources/repair/grid.net.xml")).unwrap();
    let config =
        Config::from_file(&PathBuf::from("./tests/resources/preemption/config.yml")).unwrap();
    PreemptionController::new(InMemoryControl::from_network(&network), config.preemption())
}

/// Drives south from the northern dead end towards J1 at (100, 0).
fn from_north(vehicle_type: &str, y: f64) -> SimVehicle {
    SimVehicle {
        vehicle_type: vehicle_type.to_string(),
        position: Position::new(100., y),
        velocity: Position::new(0., -10.),
        road: String::from("north_in"),
        route: vec![String::from("north_in"), String::from("23893706#0")],
        route_index: 0,
        leave_at: None,
    }
}

/// Drives east from the western dead end towards J1.
fn from_west(vehicle_type: &str, x: f64) -> SimVehicle {
    SimVehicle {
        vehicle_type: vehicle_type.to_string(),
        position: Position::new(x, 0.),
        velocity: Position::new(10., 0.),
        road: String::from("420496529#1"),
        route: vec![String::from("420496529#1"), String::from("23893706#0")],
        route_index: 0,
        leave_at: None,
    }
}

fn set_states(control: &InMemoryControl) -> Vec<&str> {
    control
        .commands
        .iter()
        .filter_map(|c| match c {
            Command::SetState { state, .. } => Some(state.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn preempt_and_restore_after_passing() {
    let mut controller = controller();
    controller
        .control_mut()
        .add_vehicle("ambulance_0", from_north("veh_ambulance", 40.));

    controller.process_emergency_vehicles().unwrap();

    let hold = controller.hold("J1").unwrap();
    assert_eq!("ambulance_0", hold.vehicle);
    assert_eq!(1, hold.priority);
    assert_eq!(2, hold.approach_link);
    let memory = controller.memory("J1").unwrap();
    assert_eq!("0", memory.program);
    assert_eq!(0, memory.phase);
    assert_approx_eq!(42., memory.remaining_duration);
    assert_eq!("rrG", controller.control().signal("J1").unwrap().state);

    // the vehicle crosses the junction and is 50m past it after 9 steps
    for _ in 0..9 {
        controller.step().unwrap();
        assert!(controller.hold("J1").is_some());
    }
    controller.step().unwrap();
    assert!(controller.hold("J1").is_none());
    assert!(controller.memory("J1").is_none());

    let control = controller.control();
    assert_eq!(vec!["rrG"], set_states(control));
    assert_eq!(
        &control.commands[1..],
        &[
            Command::SetProgram {
                tls: String::from("J1"),
                program: String::from("0")
            },
            Command::SetPhase {
                tls: String::from("J1"),
                phase: 0
            },
            Command::SetPhaseDuration {
                tls: String::from("J1"),
                duration: 42.
            },
        ]
    );
    assert_eq!("0", control.signal("J1").unwrap().program);
}

#[test]
fn higher_priority_takes_over() {
    let mut controller = controller();
    controller
        .control_mut()
        .add_vehicle("police_0", from_west("veh_police", 60.));
    controller.process_emergency_vehicles().unwrap();
    assert_eq!("police_0", controller.hold("J1").unwrap().vehicle);

    controller
        .control_mut()
        .add_vehicle("ambulance_0", from_north("veh_ambulance", 30.));
    controller.process_emergency_vehicles().unwrap();

    let hold = controller.hold("J1").unwrap();
    assert_eq!("ambulance_0", hold.vehicle);
    assert_eq!(1, hold.priority);
    // the saved state is still the one from before the first preemption
    assert_eq!("0", controller.memory("J1").unwrap().program);
    assert_eq!(vec!["GGr", "rrG"], set_states(controller.control()));
}

#[test]
fn lower_or_equal_priority_is_refused() {
    let mut controller = controller();
    controller
        .control_mut()
        .add_vehicle("ambulance_0", from_north("veh_ambulance", 30.));
    controller
        .control_mut()
        .add_vehicle("firefighter_0", from_west("veh_firefighter", 70.));

    controller.process_emergency_vehicles().unwrap();
    assert_eq!("ambulance_0", controller.hold("J1").unwrap().vehicle);
    assert!(!controller.preempt("J1", 0, "firefighter_0", 2).unwrap());
    assert!(!controller.preempt("J1", 0, "ambulance_1", 1).unwrap());

    assert_eq!(vec!["rrG"], set_states(controller.control()));
}

#[test]
fn failed_state_change_keeps_no_memory() {
    let mut controller = controller();
    controller.control_mut().reject_state_changes = true;

    assert!(controller.preempt("J1", 2, "ambulance_0", 1).is_err());
    assert!(controller.memory("J1").is_none());
    assert!(controller.hold("J1").is_none());

    // a later preemption saves the state as it is at that time
    let control = controller.control_mut();
    control.reject_state_changes = false;
    control.time = 5.;
    assert!(controller.preempt("J1", 2, "ambulance_0", 1).unwrap());
    assert_approx_eq!(37., controller.memory("J1").unwrap().remaining_duration);
}

#[test]
fn ignored_vehicles() {
    let mut controller = controller();
    let control = controller.control_mut();
    control.add_vehicle("car_0", from_north("veh_passenger", 20.));
    control.add_vehicle("ambulance_far", from_north("veh_ambulance", 80.));

    let mut in_junction = from_north("veh_ambulance", 2.);
    in_junction.road = String::from(":J1_1");
    control.add_vehicle("ambulance_inside", in_junction);

    let mut arriving = from_west("veh_police", 70.);
    arriving.route = vec![String::from("420496529#1")];
    control.add_vehicle("police_arriving", arriving);

    assert!(controller.nearby_signals("ambulance_far").unwrap().is_empty());
    assert!(controller.nearby_signals("ambulance_inside").unwrap().is_empty());
    assert_eq!(None, controller.approach_link("police_arriving", "J1").unwrap());
    assert_eq!(None, controller.priority_of("veh_passenger"));

    controller.process_emergency_vehicles().unwrap();
    assert_eq!(0, controller.preempted_signals().count());
    assert!(controller.control().commands.is_empty());
}

#[test]
fn approach_on_next_edge() {
    let mut controller = controller();
    let mut vehicle = from_west("veh_ambulance", 60.);
    // still on the edge before, which is not controlled by J1
    vehicle.road = String::from("west_feeder");
    vehicle.route = vec![
        String::from("west_feeder"),
        String::from("420496529#1"),
        String::from("23893706#0"),
    ];
    controller.control_mut().add_vehicle("ambulance_0", vehicle);

    assert_eq!(Some(0), controller.approach_link("ambulance_0", "J1").unwrap());
    let nearby = controller.nearby_signals("ambulance_0").unwrap();
    assert_eq!(1, nearby.len());
    assert_approx_eq!(40., nearby[0].distance);
}

#[test]
fn run_until_all_arrived() {
    let mut controller = controller();
    let mut vehicle = from_north("veh_firefighter", 60.);
    vehicle.leave_at = Some(5.);
    controller.control_mut().add_vehicle("firefighter_0", vehicle);

    let steps = controller.run().unwrap();

    assert_eq!(5, steps);
    assert_eq!(0, controller.control().min_expected_vehicles().unwrap());
    assert_eq!(0, controller.preempted_signals().count());
    let control = controller.into_inner();
    assert_eq!(vec!["rrG"], set_states(&control));
    assert_eq!("0", control.signal("J1").unwrap().program);
    // preempted at t=1, so one second of the first phase had passed
    assert!(control.commands.contains(&Command::SetPhaseDuration {
        tls: String::from("J1"),
        duration: 41.
    }));
}
