//! Hierarchical schematics: nested simulators, boundary crossing and
//! reference-cycle rejection.

use circuitsim::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn boot(name: &str) -> Simulator {
    clilog::init_stdout_simple_trace();
    let schematic = Schematic::load(fixture(name)).expect("load error");
    let mut sim = Simulator::new(schematic);
    for _ in 0..3 {
        sim.update().expect("build error");
    }
    assert!(sim.is_on());
    sim
}

fn press(sim: &mut Simulator, name: &str, value: u8) {
    let idx = sim.inputs[name];
    sim.update_input_pin(idx, value);
}

#[test]
fn half_adder_truth_table() {
    let mut sim = boot("hier.bdf");
    for (x, y, s, c) in [(0, 0, 0, 0), (1, 0, 1, 0),
                         (0, 1, 1, 0), (1, 1, 0, 1)] {
        press(&mut sim, "X", x);
        press(&mut sim, "Y", y);
        for _ in 0..3 {
            sim.update().unwrap();
        }
        assert_eq!(sim.output_vcc("S"), Some(s), "X={} Y={}", x, y);
        assert_eq!(sim.output_vcc("C"), Some(c), "X={} Y={}", x, y);
    }
}

#[test]
fn hierarchical_symbol_holds_a_nested_simulator() {
    let sim = boot("hier.bdf");
    let symbol = sim.components.iter()
        .find(|c| c.label == "HALFADD")
        .expect("symbol missing");
    let inner = symbol.sub_simulator().expect("no nested simulator");
    assert!(inner.is_on());
    // the boundary contract: external port names match the inner
    // primary pin names
    assert!(inner.inputs.contains_key("A"));
    assert!(inner.inputs.contains_key("B"));
    assert!(inner.outputs.contains_key("SUM"));
    assert!(inner.outputs.contains_key("CARRY"));
    // the sub-schematic is cached on the symbol part too
    assert_eq!(sim.schematic.num_sub_schematics(), 1);
}

#[test]
fn cyclic_sub_schematics_are_rejected() {
    clilog::init_stdout_simple_trace();
    assert!(Schematic::load(fixture("CYCLE_A.bdf")).is_none());
    assert!(Schematic::load(fixture("CYCLE_B.bdf")).is_none());
}
