//! An event-driven two-state logic simulator for hierarchical BDF
//! schematics.
//!
//! The pipeline: [bdfparse] turns schematic text into typed records,
//! [Schematic] resolves them (recursively loading sub-schematics from
//! sibling `.bdf` files), and [Simulator] builds a component graph by
//! geometric wire tracing and propagates voltage changes through it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use compact_str::CompactString;

pub use bdfparse::{Point, BdfRect};

/// types of directions: input or output.
///
/// note: bidirectional pins are not supported.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    /// input
    I,
    /// output
    O,
}

/// Interactive behavior of a primary input pin.
///
/// Only meaningful on the single output pin of a primary-input-pin
/// component; everywhere else it stays at the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinSettings {
    /// true: a press flips the value. false: the value follows the
    /// pressed state (hold).
    pub is_toggle: bool,
    /// whether this pin flips on its own at `clock_speed_hz`.
    pub is_clock: bool,
    /// clock rate in Hz. 0 disables flipping even when `is_clock`.
    pub clock_speed_hz: u32,
}

/// One edge of a net as seen from a pin: the peer component and the
/// peer's local pin name. Connections are symmetric; the mirror entry
/// lives on the peer's pin. The two names are not expected to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConn {
    pub peer: usize,
    pub peer_pin: CompactString,
}

/// A named electrical port of one component.
///
/// Pins live inside their owning [Component]; everything else refers
/// to them as `(component index, pin name)` pairs.
#[derive(Debug, Clone)]
pub struct Pin {
    /// unique within its side of the owning component.
    pub name: CompactString,
    pub direction: Direction,
    /// absolute schematic position (owner rect origin + local offset).
    /// Stable for the lifetime of the component.
    pub pos: Point,
    /// current logic value, 0 or 1. Numeric so the arithmetic gate
    /// formulas stay exact.
    pub vcc: u8,
    pub connections: Vec<PinConn>,
    pub settings: PinSettings,
}

impl Pin {
    pub(crate) fn new(name: CompactString, direction: Direction, pos: Point) -> Pin {
        Pin {
            name,
            direction,
            pos,
            vcc: 0,
            connections: Vec::new(),
            settings: PinSettings::default(),
        }
    }
}

mod primitive;
pub use primitive::{Primitive, DffState};

mod schematic;
pub use schematic::{Schematic, SchemPart, SchemPin, SchemSymbol, SchemPort};

mod builder;
mod simulator;

/// What a component does when evaluated.
#[derive(Debug)]
pub enum Internal {
    /// A primary schematic input. Its single output pin carries the
    /// user- or clock-driven value; evaluation is a no-op.
    PrimaryInput,
    /// A primary schematic output. Its single input pin reflects the
    /// driving net; evaluation is a no-op.
    PrimaryOutput,
    /// A hard-coded logic function from the primitive library.
    Primitive(Primitive),
    /// A symbol backed by a sub-schematic, simulated by a nested
    /// simulator.
    Hierarchical(Box<Simulator>),
    /// A symbol whose cell name matched neither a file nor a known
    /// primitive. Present but never propagates.
    Inert,
}

/// One node of the simulated component graph.
#[derive(Debug)]
pub struct Component {
    /// primary pin name, or symbol cell name.
    pub label: CompactString,
    /// symbol instance name, if any.
    pub instance: Option<CompactString>,
    pub rect: BdfRect,
    pub inputs: Vec<Pin>,
    pub outputs: Vec<Pin>,
    pub internal: Internal,
    /// last simulation step that evaluated this component. Guards
    /// against re-entry within one propagation step.
    pub tick: u64,
}

impl Component {
    #[inline]
    pub fn input(&self, name: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    #[inline]
    pub fn input_mut(&mut self, name: &str) -> Option<&mut Pin> {
        self.inputs.iter_mut().find(|p| p.name == name)
    }

    #[inline]
    pub fn output(&self, name: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    #[inline]
    pub fn output_mut(&mut self, name: &str) -> Option<&mut Pin> {
        self.outputs.iter_mut().find(|p| p.name == name)
    }

    /// Pin lookup by side and index within that side.
    #[inline]
    pub fn pin(&self, direction: Direction, idx: usize) -> &Pin {
        match direction {
            Direction::I => &self.inputs[idx],
            Direction::O => &self.outputs[idx],
        }
    }

    /// The nested simulator of a hierarchical symbol, for drill-in.
    #[inline]
    pub fn sub_simulator(&self) -> Option<&Simulator> {
        match &self.internal {
            Internal::Hierarchical(sim) => Some(sim),
            _ => None,
        }
    }

    #[inline]
    pub fn is_primary_input(&self) -> bool {
        matches!(self.internal, Internal::PrimaryInput)
    }
}

/// Startup phases of a simulator, advanced one [Simulator::update]
/// call at a time so a render loop can display progress in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Off,
    /// announced; the next update runs the netlist builder.
    Building,
    /// netlist ready; the next update runs the initial full rescan.
    Built,
    On,
}

/// A clock-driven primary input pin.
#[derive(Debug)]
struct Clock {
    comp: usize,
    /// monotonic, never wall time.
    last_toggle: Instant,
}

/// The simulation engine owning one schematic's component graph.
///
/// The public members are all READ-ONLY outside. Please modify the
/// simulation through the update entry points.
#[readonly::make]
#[derive(Debug)]
pub struct Simulator {
    pub schematic: Arc<Schematic>,
    /// the component graph, index-aligned with [Schematic::parts].
    pub components: Vec<Component>,
    /// status line for the renderer overlay:
    /// "Off" | "Building…" | "On (…)".
    pub status: String,
    /// monotonically increasing propagation step counter.
    pub simulation_tick: u64,
    pub built: bool,
    /// primary input pin name to component index.
    pub inputs: HashMap<CompactString, usize>,
    /// primary output pin name to component index.
    pub outputs: HashMap<CompactString, usize>,
    /// components whose inputs changed and that await evaluation.
    dirty: HashSet<usize>,
    /// wire position to the pin whose trace covered it, for the
    /// renderer's voltage colouring.
    wire_vcc_lookup: HashMap<Point, (usize, Direction, usize)>,
    clocks: Vec<Clock>,
    build_state: BuildState,
}
