//! Sequential behavior: flip-flop capture, the ripple counter, and
//! real-time clock pins.

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
fn dff_captures_on_rising_edge_only() {
    let mut sim = boot("dff.bdf");
    assert_eq!(sim.output_vcc("Q"), Some(0));

    // D high, then a rising clock edge: captured
    press(&mut sim, "D", 1);
    sim.update().unwrap();
    press(&mut sim, "CLK", 1);
    sim.update().unwrap();
    assert_eq!(sim.output_vcc("Q"), Some(1));

    // D drops while the clock stays high: no edge, held
    press(&mut sim, "D", 0);
    sim.update().unwrap();
    assert_eq!(sim.output_vcc("Q"), Some(1));

    // falling edge: still held
    press(&mut sim, "CLK", 0);
    sim.update().unwrap();
    assert_eq!(sim.output_vcc("Q"), Some(1));

    // the next rising edge captures the new D
    press(&mut sim, "CLK", 1);
    sim.update().unwrap();
    assert_eq!(sim.output_vcc("Q"), Some(0));
}

#[test]
fn ripple_counter_counts_clock_edges() {
    let mut sim = boot("counter.bdf");
    // let the inverter feedback nets settle before clocking
    for _ in 0..4 {
        sim.update().unwrap();
    }

    for n in 1u32..=20 {
        press(&mut sim, "CLK", 1);
        sim.update().unwrap();
        sim.update().unwrap();
        press(&mut sim, "CLK", 0);
        sim.update().unwrap();
        sim.update().unwrap();

        let count = (0..4).fold(0u32, |acc, bit| {
            let name = format!("Q{}", bit + 1);
            acc | (u32::from(sim.output_vcc(&name).unwrap()) << bit)
        });
        assert_eq!(count, n % 16, "after {} rising edges", n);
    }
}

#[test]
fn clock_pin_flips_in_real_time() {
    let mut sim = boot("notgate.bdf");
    let a = sim.inputs["A"];
    sim.set_pin_settings(a, PinSettings {
        is_clock: true,
        clock_speed_hz: 1000,
        ..Default::default()
    });

    let before = sim.input_vcc("A").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    sim.update().unwrap();
    let after = sim.input_vcc("A").unwrap();
    assert_eq!(after, 1 - before);
    // the flip propagated through the inverter in the same step
    assert_eq!(sim.output_vcc("Y"), Some(1 - after));

    // a zero rate keeps the pin untouched no matter the elapsed time
    sim.set_pin_settings(a, PinSettings {
        is_clock: true,
        clock_speed_hz: 0,
        ..Default::default()
    });
    std::thread::sleep(std::time::Duration::from_millis(5));
    sim.update().unwrap();
    assert_eq!(sim.input_vcc("A"), Some(after));

    // switching is_clock off unregisters the pin
    sim.set_pin_settings(a, PinSettings {
        is_clock: false,
        clock_speed_hz: 1000,
        ..Default::default()
    });
    std::thread::sleep(std::time::Duration::from_millis(5));
    sim.update().unwrap();
    assert_eq!(sim.input_vcc("A"), Some(after));
}
