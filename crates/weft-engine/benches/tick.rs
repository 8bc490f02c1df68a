//! Mesh generation and tick throughput on an inverter-style chain.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use weft_core::{Chip, ChipTemplate, Design, LogicState, Pin, WireEnd};
use weft_engine::{EngineConfig, MeshSimulator, Simulator};

/// A chain of NOR gates, each fed by its predecessor (the second input
/// left floating reads low, so every stage inverts).
fn gate_chain(length: usize) -> Design {
    let mut design = Design::new();
    let head = design.add_pin(Pin::new("head"));
    let source = weft_chips::driven(LogicState::High);
    let source_out = source.output_pins()[0].id();
    let driver = design.add_chip(Chip::new("driver", ChipTemplate::Builtin(source)));
    design.add_segment(WireEnd::chip_pin(driver, source_out), WireEnd::design_pin(head));

    let mut previous = WireEnd::design_pin(head);
    for index in 0..length {
        let template = weft_chips::nor();
        let input = template.input_pins()[0].id();
        let output = template.output_pins()[0].id();
        let chip = design.add_chip(Chip::new(format!("inv{index}"), ChipTemplate::Builtin(template)));
        design.add_segment(previous, WireEnd::chip_pin(chip, input));
        previous = WireEnd::chip_pin(chip, output);
    }
    design
}

fn bench_mesh_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_generation");
    for length in [16, 128] {
        let design = gate_chain(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &design, |b, design| {
            b.iter(|| weft_mesh::build(design).unwrap());
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for length in [16, 128] {
        let design = gate_chain(length);
        let sim = MeshSimulator::new(&EngineConfig {
            worker_threads: 4,
            ..Default::default()
        });
        sim.initialize(&design).unwrap();
        sim.start();
        group.bench_function(BenchmarkId::from_parameter(length), |b| {
            b.iter(|| sim.tick());
        });
        sim.stop();
    }
    group.finish();
}

criterion_group!(benches, bench_mesh_generation, bench_tick);
criterion_main!(benches);
