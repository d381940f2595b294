//! Schematic loading: walk the parsed record list, classify it, and
//! resolve referenced sub-schematic files recursively.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use bdfparse::{Bdf, BdfRecord, BdfPin, BdfSymbol, BdfDirection, Point, BdfRect};

use crate::Direction;

/// A loaded schematic.
///
/// The public members are all READ-ONLY outside. A schematic is
/// immutable once loaded; reloading replaces the whole object.
#[readonly::make]
#[derive(Debug)]
pub struct Schematic {
    /// the file this schematic was loaded from.
    pub path: PathBuf,
    /// primary pins and symbols, in file order. The simulated
    /// component graph is index-aligned with this list.
    pub parts: Vec<SchemPart>,
    /// wire segments, used for net tracing at build time and for
    /// rendering afterwards.
    pub wires: Vec<(Point, Point)>,
    /// junction dots, render only.
    pub junctions: Vec<Point>,
}

/// A schematic element that becomes a simulated component.
#[derive(Debug)]
pub enum SchemPart {
    Pin(SchemPin),
    Symbol(SchemSymbol),
}

/// A primary schematic pin.
#[derive(Debug)]
pub struct SchemPin {
    pub name: CompactString,
    /// direction as written in the record. `I` marks a primary input
    /// of the schematic; electrically such a pin *drives* its net.
    pub direction: Direction,
    pub rect: BdfRect,
    /// absolute connection point.
    pub pos: Point,
}

/// An instantiated cell.
#[derive(Debug)]
pub struct SchemSymbol {
    pub cell: CompactString,
    pub instance: Option<CompactString>,
    pub rect: BdfRect,
    pub ports: Vec<SchemPort>,
    /// the cached child schematic, when `<cell>.bdf` exists beside
    /// this schematic.
    pub sub: Option<Arc<Schematic>>,
}

/// One port of a symbol, at its absolute position.
#[derive(Debug)]
pub struct SchemPort {
    pub name: CompactString,
    pub direction: Direction,
    pub pos: Point,
}

fn direction_of(d: BdfDirection) -> Direction {
    match d {
        BdfDirection::Input => Direction::I,
        BdfDirection::Output => Direction::O,
    }
}

/// The pin name is the second text record (the first is the
/// INPUT/OUTPUT caption on pins, and the port caption on ports).
fn name_of(texts: &[bdfparse::BdfText]) -> Option<CompactString> {
    texts.get(1).map(|t| t.text.clone())
}

fn load_pin(pin: BdfPin, path: &Path) -> Option<SchemPin> {
    let (rect, pt) = match (pin.rect, pin.pt) {
        (Some(rect), Some(pt)) => (rect, pt),
        _ => {
            clilog::error!(SDB_PIN_SHAPE,
                           "pin record without rect/pt in {}",
                           path.display());
            return None
        }
    };
    let name = match name_of(&pin.texts) {
        Some(name) => name,
        None => {
            clilog::error!(SDB_PIN_NAME,
                           "pin record without a name text in {}",
                           path.display());
            return None
        }
    };
    Some(SchemPin {
        name,
        direction: direction_of(pin.direction),
        rect,
        pos: Point(rect.x1 + pt.0, rect.y1 + pt.1),
    })
}

fn load_symbol(
    sym: BdfSymbol,
    working_dir: &Path,
    path: &Path,
    parents: &mut HashSet<PathBuf>,
) -> Option<SchemSymbol> {
    let rect = match sym.rect {
        Some(rect) => rect,
        None => {
            clilog::error!(SDB_SYM_RECT,
                           "symbol record without a rect in {} -- \
                            its ports cannot be positioned",
                           path.display());
            return None
        }
    };
    let cell = match sym.texts.first() {
        Some(t) => t.text.clone(),
        None => {
            clilog::error!(SDB_SYM_NAME,
                           "symbol record without a name text in {}",
                           path.display());
            return None
        }
    };
    let instance = sym.texts.get(1).map(|t| t.text.clone());

    let mut ports = Vec::with_capacity(sym.ports.len());
    for port in sym.ports {
        let name = match name_of(&port.texts) {
            Some(name) => name,
            None => {
                clilog::error!(SDB_PIN_NAME,
                               "port record of symbol {} without a name \
                                text in {}", cell, path.display());
                return None
            }
        };
        // shaping guarantees ports carry a pt.
        let pt = port.pt.unwrap();
        ports.push(SchemPort {
            name,
            direction: direction_of(port.direction),
            pos: Point(rect.x1 + pt.0, rect.y1 + pt.1),
        });
    }

    let sub_path = working_dir.join(format!("{}.bdf", cell));
    let sub = match sub_path.exists() {
        true => Some(Schematic::load_guarded(&sub_path, parents)?),
        false => None,
    };

    Some(SchemSymbol { cell, instance, rect, ports, sub })
}

impl Schematic {
    /// Load a schematic file, recursively loading every referenced
    /// sub-schematic. Emits an error and returns None on malformed
    /// input or cyclic sub-schematic references.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Option<Arc<Schematic>> {
        Schematic::load_guarded(path.as_ref(), &mut HashSet::new())
    }

    /// `parents` holds the canonical paths currently being loaded.
    /// Without this check, the program would stuck on bad user input.
    #[must_use]
    fn load_guarded(
        path: &Path, parents: &mut HashSet<PathBuf>
    ) -> Option<Arc<Schematic>> {
        let canon = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                clilog::error!(SDB_IO, "cannot resolve schematic path {}: {}",
                               path.display(), e);
                return None
            }
        };
        if !parents.insert(canon.clone()) {
            clilog::error!(SDB_RECUR,
                           "sub-schematic {} has recursion which is \
                            NOT allowed", path.display());
            return None
        }
        let guard_key = canon.clone();
        let mut parents = scopeguard::guard(parents, move |parents| {
            parents.remove(&guard_key);
        });

        let bdf = match Bdf::parse_file(&canon) {
            Ok(bdf) => bdf,
            Err(e) => {
                clilog::error!(SDB_PARSE, "Parse schematic file {} failed: {}",
                               path.display(), e);
                return None
            }
        };
        let working_dir = canon.parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut parts = Vec::new();
        let mut wires = Vec::new();
        let mut junctions = Vec::new();

        for record in bdf.records {
            match record {
                BdfRecord::Junction(p) => junctions.push(p),
                BdfRecord::Connector(a, b) => wires.push((a, b)),
                BdfRecord::Pin(pin) => {
                    parts.push(SchemPart::Pin(load_pin(pin, path)?));
                }
                BdfRecord::Symbol(sym) => {
                    parts.push(SchemPart::Symbol(load_symbol(
                        sym, &working_dir, path, &mut parents)?));
                }
                BdfRecord::Header(_) | BdfRecord::Version(_)
                    | BdfRecord::Text(_) => {}
                BdfRecord::Unknown(node) => {
                    clilog::warn!(SDB_UNK_RECORD,
                                  "unknown record in {}, skipped: {}",
                                  path.display(), node);
                }
            }
        }

        Some(Arc::new(Schematic { path: canon, parts, wires, junctions }))
    }

    /// Number of sub-schematic instances directly below this one.
    pub fn num_sub_schematics(&self) -> usize {
        self.parts.iter().filter(|p| matches!(
            p, SchemPart::Symbol(s) if s.sub.is_some()
        )).count()
    }
}
