//! Netlist construction: instantiate one component per schematic
//! part, then derive pin-to-pin connectivity by tracing the wire
//! graph geometrically from every pin position.

use std::collections::{HashMap, HashSet};

use bdfparse::Point;

use crate::{
    Component, Direction, Internal, Pin, PinConn, Primitive, Simulator,
};
use crate::schematic::{SchemPart, SchemPin, SchemSymbol};

/// A primary pin record exposes the *opposite* side electrically: an
/// input pin drives its net, an output pin listens on it.
fn make_pin_component(pin: &SchemPin) -> Component {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    match pin.direction {
        Direction::I => outputs.push(
            Pin::new(pin.name.clone(), Direction::O, pin.pos)),
        Direction::O => inputs.push(
            Pin::new(pin.name.clone(), Direction::I, pin.pos)),
    }
    Component {
        label: pin.name.clone(),
        instance: None,
        rect: pin.rect,
        inputs,
        outputs,
        internal: match pin.direction {
            Direction::I => Internal::PrimaryInput,
            Direction::O => Internal::PrimaryOutput,
        },
        tick: 0,
    }
}

#[must_use]
fn make_symbol_component(sym: &SchemSymbol) -> Option<Component> {
    let mut inputs: Vec<Pin> = Vec::new();
    let mut outputs: Vec<Pin> = Vec::new();
    for port in &sym.ports {
        let side = match port.direction {
            Direction::I => &mut inputs,
            Direction::O => &mut outputs,
        };
        if side.iter().any(|p| p.name == port.name) {
            clilog::error!(SIM_DUP_PIN,
                           "Failed to build connection map: symbol {} has \
                            two or more {:?} pins named {}",
                           sym.cell, port.direction, port.name);
            return None
        }
        side.push(Pin::new(port.name.clone(), port.direction, port.pos));
    }

    let internal = match &sym.sub {
        Some(sub) => {
            let inner = Simulator::new_nested(sub.clone())?;
            // the boundary contract: external port names must match
            // the primary pin names of the inner schematic.
            for pin in inputs.iter() {
                if !inner.inputs.contains_key(pin.name.as_str()) {
                    clilog::warn!(SIM_BOUNDARY,
                                  "input port {} of {} has no primary input \
                                   pin in {}", pin.name, sym.cell,
                                  sub.path.display());
                }
            }
            for pin in outputs.iter() {
                if !inner.outputs.contains_key(pin.name.as_str()) {
                    clilog::warn!(SIM_BOUNDARY,
                                  "output port {} of {} has no primary output \
                                   pin in {}", pin.name, sym.cell,
                                  sub.path.display());
                }
            }
            Internal::Hierarchical(Box::new(inner))
        }
        None => match Primitive::lookup(&sym.cell) {
            Some(prim) => Internal::Primitive(prim),
            None => {
                clilog::warn!(SIM_UNK_PRIM,
                              "Component '{}' is not implemented, any logic \
                               connected will not update", sym.cell);
                Internal::Inert
            }
        }
    };

    Some(Component {
        label: sym.cell.clone(),
        instance: sym.instance.clone(),
        rect: sym.rect,
        inputs,
        outputs,
        internal,
        tick: 0,
    })
}

/// Walk the net containing `start` over the wire adjacency, with an
/// explicit work stack (nets can span thousands of segments). Returns
/// the peers found along the way (excluding pins of `self_comp`) and
/// every visited position.
fn trace_net(
    start: Point,
    self_comp: usize,
    pin_at: &HashMap<Point, Vec<(usize, Direction, usize)>>,
    wire_at: &HashMap<Point, Vec<Point>>,
) -> (Vec<(usize, Direction, usize)>, Vec<Point>) {
    let mut peers = Vec::new();
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if !seen.insert(pos) {
            continue
        }
        order.push(pos);
        if let Some(pins) = pin_at.get(&pos) {
            peers.extend(pins.iter()
                         .filter(|(comp, _, _)| *comp != self_comp)
                         .copied());
        }
        if let Some(nexts) = wire_at.get(&pos) {
            stack.extend(nexts.iter().copied()
                         .filter(|next| !seen.contains(next)));
        }
    }
    (peers, order)
}

impl Simulator {
    /// Rebuild the component graph and all connectivity lookups from
    /// the owned schematic.
    #[must_use]
    pub(crate) fn build_netlist(&mut self) -> Option<()> {
        let timer = clilog::stimer!("build_netlist");
        let schematic = self.schematic.clone();

        self.components.clear();
        self.inputs.clear();
        self.outputs.clear();
        self.wire_vcc_lookup.clear();
        self.clocks.clear();
        self.dirty.clear();

        for part in &schematic.parts {
            let comp = match part {
                SchemPart::Pin(pin) => make_pin_component(pin),
                SchemPart::Symbol(sym) => make_symbol_component(sym)?,
            };
            let idx = self.components.len();
            match comp.internal {
                Internal::PrimaryInput => {
                    if self.inputs.insert(comp.label.clone(), idx).is_some() {
                        clilog::warn!(SIM_DUP_IO,
                                      "duplicate primary input pin name {}",
                                      comp.label);
                    }
                }
                Internal::PrimaryOutput => {
                    if self.outputs.insert(comp.label.clone(), idx).is_some() {
                        clilog::warn!(SIM_DUP_IO,
                                      "duplicate primary output pin name {}",
                                      comp.label);
                    }
                }
                _ => {}
            }
            self.components.push(comp);
        }

        // position lookups for the geometric trace
        let mut pin_at: HashMap<Point, Vec<(usize, Direction, usize)>> =
            HashMap::new();
        for (ci, comp) in self.components.iter().enumerate() {
            for (pi, pin) in comp.inputs.iter().enumerate() {
                pin_at.entry(pin.pos).or_default()
                    .push((ci, Direction::I, pi));
            }
            for (pi, pin) in comp.outputs.iter().enumerate() {
                pin_at.entry(pin.pos).or_default()
                    .push((ci, Direction::O, pi));
            }
        }
        let mut wire_at: HashMap<Point, Vec<Point>> = HashMap::new();
        for (a, b) in &schematic.wires {
            wire_at.entry(*a).or_default().push(*b);
            wire_at.entry(*b).or_default().push(*a);
        }

        // trace the net of every pin. connections come out symmetric
        // because each endpoint runs its own trace over the same
        // undirected adjacency.
        let mut traces = Vec::new();
        for (ci, comp) in self.components.iter().enumerate() {
            for (pi, pin) in comp.inputs.iter().enumerate() {
                traces.push((ci, Direction::I, pi,
                             trace_net(pin.pos, ci, &pin_at, &wire_at)));
            }
            for (pi, pin) in comp.outputs.iter().enumerate() {
                traces.push((ci, Direction::O, pi,
                             trace_net(pin.pos, ci, &pin_at, &wire_at)));
            }
        }

        for (ci, dir, pi, (peers, visited)) in traces {
            let connections = peers.iter()
                .map(|&(peer, pdir, ppi)| PinConn {
                    peer,
                    peer_pin: self.components[peer].pin(pdir, ppi).name.clone(),
                })
                .collect::<Vec<_>>();
            let comp = &mut self.components[ci];
            match dir {
                Direction::I => comp.inputs[pi].connections = connections,
                Direction::O => comp.outputs[pi].connections = connections,
            }
            for pos in visited {
                self.wire_vcc_lookup.insert(pos, (ci, dir, pi));
            }
        }

        clilog::finish!(timer);
        Some(())
    }
}
