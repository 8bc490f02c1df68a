//! Weft quickstart — build and run an SR latch from scratch.
//!
//! Demonstrates:
//!   1. Composing a design from built-in chips and wires
//!   2. Initializing the mesh simulator through the Simulation facade
//!   3. Running the paced tick timer
//!   4. Stimulating the circuit and reading simulated states
//!
//! Run with:
//!   cargo run --example quickstart

use std::time::Duration;

use weft_core::{Chip, ChipTemplate, Design, LogicState, Pin, PinId, WireEnd};
use weft_engine::{EngineConfig, Simulation};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut design = Design::new();
    let q = design.add_pin(Pin::new("q"));
    let q_bar = design.add_pin(Pin::new("q_bar"));
    let s_net = design.add_pin(Pin::new("s"));
    let r_net = design.add_pin(Pin::new("r"));

    let (set_template, set) = weft_chips::toggle();
    attach(&mut design, "set", set_template.clone(), s_net);
    let (reset_template, reset) = weft_chips::toggle();
    attach(&mut design, "reset", reset_template.clone(), r_net);

    // Q = NOR(R, Q̄); Q̄ = NOR(S, Q).
    let nor_q = weft_chips::nor();
    let nor_qb = weft_chips::nor();
    let gate_q = design.add_chip(Chip::new("nor_q", ChipTemplate::Builtin(nor_q.clone())));
    let gate_qb = design.add_chip(Chip::new("nor_qb", ChipTemplate::Builtin(nor_qb.clone())));
    design.add_segment(
        WireEnd::chip_pin(gate_q, nor_q.input_pins()[0].id()),
        WireEnd::design_pin(r_net),
    );
    design.add_segment(
        WireEnd::chip_pin(gate_qb, nor_qb.input_pins()[0].id()),
        WireEnd::design_pin(s_net),
    );
    design.add_segment(
        WireEnd::chip_pin(gate_q, nor_q.output_pins()[0].id()),
        WireEnd::design_pin(q),
    );
    design.add_segment(
        WireEnd::chip_pin(gate_qb, nor_qb.output_pins()[0].id()),
        WireEnd::design_pin(q_bar),
    );
    design.add_segment(
        WireEnd::chip_pin(gate_q, nor_q.input_pins()[1].id()),
        WireEnd::design_pin(q_bar),
    );
    design.add_segment(
        WireEnd::chip_pin(gate_qb, nor_qb.input_pins()[1].id()),
        WireEnd::design_pin(q),
    );

    let config = EngineConfig {
        worker_threads: 4,
        target_cycle: Duration::from_millis(2),
    };
    let simulation = Simulation::with_mesh_simulator(&config).expect("valid config");
    let root = simulation.initialize(&design).expect("mesh generation");
    simulation.start();

    let read = |label: &str, root: &weft_mesh::SimulatedDesign, q: PinId, q_bar: PinId| {
        println!(
            "{label:>12}  Q={}  Q̄={}",
            root.state_for_pin(q),
            root.state_for_pin(q_bar)
        );
    };

    let settle = Duration::from_millis(50);

    set.set(true);
    std::thread::sleep(settle);
    read("set", &root, q, q_bar);

    set.set(false);
    std::thread::sleep(settle);
    read("hold", &root, q, q_bar);

    reset.set(true);
    std::thread::sleep(settle);
    read("reset", &root, q, q_bar);

    reset.set(false);
    std::thread::sleep(settle);
    read("hold", &root, q, q_bar);

    assert_eq!(root.state_for_pin(q), LogicState::Low);
    assert_eq!(root.state_for_pin(q_bar), LogicState::High);

    simulation.stop();
}

fn attach(
    design: &mut Design,
    label: &str,
    template: std::sync::Arc<weft_core::BuiltinTemplate>,
    net: PinId,
) {
    let out = template.output_pins()[0].id();
    let chip = design.add_chip(Chip::new(label, ChipTemplate::Builtin(template)));
    design.add_segment(WireEnd::chip_pin(chip, out), WireEnd::design_pin(net));
}
