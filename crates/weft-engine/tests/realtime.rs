//! The full lifecycle surface driven through the timer thread.

use std::time::{Duration, Instant};

use weft_core::{Chip, ChipTemplate, Design, LogicState, Pin, WireEnd};
use weft_engine::{EngineConfig, Simulation};

#[test]
fn a_running_simulation_tracks_external_stimulus() {
    let config = EngineConfig {
        worker_threads: 4,
        target_cycle: Duration::from_millis(1),
    };
    let simulation = Simulation::with_mesh_simulator(&config).unwrap();

    let mut design = Design::new();
    let probe = design.add_pin(Pin::new("probe"));
    let (toggle_template, toggle) = weft_chips::toggle();
    let out = toggle_template.output_pins()[0].id();
    let chip = design.add_chip(Chip::new("switch", ChipTemplate::Builtin(toggle_template)));
    design.add_segment(WireEnd::chip_pin(chip, out), WireEnd::design_pin(probe));

    let root = simulation.initialize(&design).unwrap();

    assert!(!simulation.is_running());
    simulation.start();
    assert!(simulation.is_running());

    let wait_for = |expected: LogicState| {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if root.state_for_pin(probe) == expected {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("probe never reached {expected}");
    };

    wait_for(LogicState::Low);
    toggle.set(true);
    wait_for(LogicState::High);
    toggle.set(false);
    wait_for(LogicState::Low);

    simulation.stop();
    assert!(!simulation.is_running());
}
