use circuitsim::{Schematic, Simulator};
use itertools::Itertools;
use std::env;

/// Headless driver: load a schematic, bring the simulator up, run a
/// few steady propagation steps and print the primary pin state.
fn main() {
    clilog::init_stderr_color_debug();
    clilog::enable_timer("circuitsim");
    let args: Vec<String> = env::args().collect();
    assert!(args.len() == 2,
            "Usage: {} <schematic.bdf>", args[0]);

    let schematic = Schematic::load(&args[1])
        .expect("Error loading the schematic");
    let mut sim = Simulator::new(schematic);
    while !sim.is_on() {
        sim.update().expect("Error building the simulator");
    }
    for _ in 0..16 {
        sim.update().expect("Error running the simulation");
    }

    println!("Simulation of {}", args[1]);
    println!("status:         {}", sim.status);
    println!("num components: {}", sim.components.len());
    println!("num wires:      {}", sim.schematic.wires.len());
    println!("inputs:  {}", sim.inputs.keys().sorted()
             .map(|name| format!("{}={}", name, sim.input_vcc(name).unwrap()))
             .format(", "));
    println!("outputs: {}", sim.outputs.keys().sorted()
             .map(|name| format!("{}={}", name, sim.output_vcc(name).unwrap()))
             .format(", "));
}
