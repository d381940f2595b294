//! The event-driven evaluator: clock injection, dirty-queue
//! propagation with a per-step tick guard, and hierarchical boundary
//! crossing into nested simulators.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::{
    BuildState, Clock, Component, Internal, PinConn, PinSettings,
    Point, Schematic, Simulator,
};

impl Simulator {
    /// Create a simulator in the Off state. The netlist is built over
    /// the first [Simulator::update] calls so a render loop can show
    /// progress in between.
    pub fn new(schematic: Arc<Schematic>) -> Simulator {
        Simulator {
            schematic,
            components: Vec::new(),
            status: "Off".into(),
            simulation_tick: 1,
            built: false,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            dirty: HashSet::new(),
            wire_vcc_lookup: HashMap::new(),
            clocks: Vec::new(),
            build_state: BuildState::Off,
        }
    }

    /// Eagerly bootstrap a nested simulator for a hierarchical symbol.
    #[must_use]
    pub(crate) fn new_nested(schematic: Arc<Schematic>) -> Option<Simulator> {
        let mut sim = Simulator::new(schematic);
        let mut cycles = 0;
        while !sim.is_on() && cycles < 10 {
            sim.update()?;
            cycles += 1;
        }
        if !sim.is_on() {
            clilog::error!(SIM_BOOTSTRAP,
                           "sub-schematic {} failed to build within {} \
                            bootstrap cycles",
                           sim.schematic.path.display(), cycles);
            return None
        }
        Some(sim)
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.build_state == BuildState::On
    }

    /// Advance the simulator by one cycle of the cooperative loop:
    /// first the staged startup protocol, then one propagation step
    /// per call.
    #[must_use]
    pub fn update(&mut self) -> Option<()> {
        match self.build_state {
            BuildState::Off => {
                self.status = "Building".into();
                self.build_state = BuildState::Building;
            }
            BuildState::Building => {
                let start = Instant::now();
                self.build_netlist()?;
                self.status = format!("Building (built in {}ms)",
                                      start.elapsed().as_millis());
                self.build_state = BuildState::Built;
            }
            BuildState::Built => {
                let start = Instant::now();
                self.full_rescan();
                self.update_simulation();
                self.status = format!("On (restarted in {}ms)",
                                      start.elapsed().as_millis());
                self.build_state = BuildState::On;
                self.built = true;
            }
            BuildState::On => self.update_simulation(),
        }
        Some(())
    }

    /// Flip every due clock pin and mark its component dirty.
    fn update_clocks(&mut self) {
        let now = Instant::now();
        for clock in self.clocks.iter_mut() {
            let pin = match self.components[clock.comp].outputs.first_mut() {
                Some(pin) => pin,
                None => continue,
            };
            let hz = pin.settings.clock_speed_hz;
            if hz == 0 {
                continue
            }
            let period = Duration::from_secs_f64(1.0 / hz as f64);
            if now.duration_since(clock.last_toggle) >= period {
                pin.vcc = 1 - pin.vcc;
                clock.last_toggle = now;
                self.dirty.insert(clock.comp);
            }
        }
    }

    /// One propagation step: drain the dirty set into a FIFO queue
    /// and run it down. The tick guard evaluates each component at
    /// most once per step, so feedback loops settle over successive
    /// steps instead of livelocking; a value reaching an
    /// already-evaluated component is still written and re-queues it
    /// for the next step.
    fn update_simulation(&mut self) {
        self.update_clocks();

        // ascending index order keeps replay deterministic.
        let mut queue: VecDeque<usize> =
            self.dirty.drain().sorted().collect();

        while let Some(k) = queue.pop_front() {
            if self.components[k].tick >= self.simulation_tick {
                continue
            }
            self.components[k].tick = self.simulation_tick;

            let comp = &mut self.components[k];

            // cross the hierarchy boundary inward: external input
            // values drive the inner primary input pin components.
            {
                let Component { inputs, internal, .. } = &mut *comp;
                if let Internal::Hierarchical(inner) = internal {
                    for pin in inputs.iter() {
                        if let Some(&idx) =
                            inner.inputs.get(pin.name.as_str())
                        {
                            inner.components[idx].outputs[0].vcc = pin.vcc;
                            inner.dirty.insert(idx);
                        }
                    }
                }
            }

            let snapshot: Vec<u8> =
                comp.outputs.iter().map(|p| p.vcc).collect();

            let changed: Vec<(u8, Vec<PinConn>)> = {
                let Component { inputs, outputs, internal, .. } = &mut *comp;
                // a primary input's value is set from outside the
                // step (button or clock), which the snapshot cannot
                // see; push it unconditionally. peers only enqueue on
                // an actual value change.
                let force = matches!(&*internal, Internal::PrimaryInput);
                match internal {
                    Internal::Primitive(prim) =>
                        prim.evaluate(inputs, outputs),
                    Internal::Hierarchical(inner) => {
                        inner.update_simulation();
                        // cross the boundary outward: inner primary
                        // output pins feed the external output pins.
                        for pin in outputs.iter_mut() {
                            if let Some(&idx) =
                                inner.outputs.get(pin.name.as_str())
                            {
                                let vcc =
                                    inner.components[idx].inputs[0].vcc;
                                if pin.vcc != vcc {
                                    pin.vcc = vcc;
                                }
                            }
                        }
                    }
                    Internal::PrimaryInput | Internal::PrimaryOutput
                        | Internal::Inert => {}
                }
                outputs.iter()
                    .zip(&snapshot)
                    .filter(|(pin, old)| force || pin.vcc != **old)
                    .map(|(pin, _)| (pin.vcc, pin.connections.clone()))
                    .collect()
            };

            for (vcc, connections) in changed {
                for conn in connections {
                    let fresh =
                        self.components[conn.peer].tick < self.simulation_tick;
                    let peer = &mut self.components[conn.peer];
                    if let Some(pin) = peer.input_mut(&conn.peer_pin) {
                        if pin.vcc != vcc {
                            pin.vcc = vcc;
                            if fresh {
                                queue.push_back(conn.peer);
                            } else {
                                self.dirty.insert(conn.peer);
                            }
                        }
                    }
                }
            }
        }

        self.simulation_tick += 1;
    }

    /// Drive a primary input pin from the UI. `pressed` is the button
    /// state: toggle pins flip on press only, hold pins follow it.
    pub fn update_input_pin(&mut self, comp: usize, pressed: u8) {
        match self.components.get_mut(comp) {
            Some(component) if component.is_primary_input() => {
                let pin = &mut component.outputs[0];
                if pin.settings.is_toggle {
                    if pressed == 1 {
                        pin.vcc = 1 - pin.vcc;
                    }
                } else {
                    pin.vcc = (pressed != 0) as u8;
                }
                self.dirty.insert(comp);
            }
            _ => {
                clilog::warn!(SIM_NOT_INPUT,
                              "component {} is not a primary input pin", comp);
            }
        }
    }

    /// Edit the interactive settings of a primary input pin, keeping
    /// the clocks list in sync.
    pub fn set_pin_settings(&mut self, comp: usize, settings: PinSettings) {
        match self.components.get_mut(comp) {
            Some(component) if component.is_primary_input() => {
                component.outputs[0].settings = settings;
                let registered =
                    self.clocks.iter().position(|c| c.comp == comp);
                match (settings.is_clock, registered) {
                    (true, None) => self.clocks.push(Clock {
                        comp,
                        last_toggle: Instant::now(),
                    }),
                    (false, Some(i)) => {
                        self.clocks.remove(i);
                    }
                    _ => {}
                }
            }
            _ => {
                clilog::warn!(SIM_NOT_INPUT,
                              "component {} is not a primary input pin", comp);
            }
        }
    }

    /// Mark every component for re-evaluation on the next step.
    pub fn full_rescan(&mut self) {
        self.dirty.extend(0..self.components.len());
    }

    /// Voltage shown on a wire position, or None if the position is
    /// on no net.
    pub fn get_wire_vcc(&self, pos: Point) -> Option<u8> {
        let &(comp, dir, pi) = self.wire_vcc_lookup.get(&pos)?;
        Some(self.components[comp].pin(dir, pi).vcc)
    }

    /// Current value driven by a primary input pin, by name.
    pub fn input_vcc(&self, name: &str) -> Option<u8> {
        let &idx = self.inputs.get(name)?;
        Some(self.components[idx].outputs[0].vcc)
    }

    /// Current value of a primary output pin, by name.
    pub fn output_vcc(&self, name: &str) -> Option<u8> {
        let &idx = self.outputs.get(name)?;
        Some(self.components[idx].inputs[0].vcc)
    }

    /// Re-parse the schematic from disk and rebuild from scratch. The
    /// startup protocol runs again on the following updates.
    #[must_use]
    pub fn reload(&mut self) -> Option<()> {
        let schematic = Schematic::load(&self.schematic.path)?;
        *self = Simulator::new(schematic);
        Some(())
    }
}
