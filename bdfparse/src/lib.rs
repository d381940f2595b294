//! A Quartus BDF (Block Diagram File) schematic parser written in Rust.
//!
//! # Usage
//!
//! Just pass a `&str` to [Bdf::parse_str]. Example:
//! ```
//! use bdfparse::Bdf;
//!
//! let _parsed = Bdf::parse_str(r#"
//! /* generated block diagram */
//! (header "graphic" (version "1.4"))
//! (pin
//!     (input)
//!     (rect 16 64 184 80)
//!     (text "INPUT" (rect 125 0 166 12)(font "Arial" (font_size 10)))
//!     (text "A" (rect 90 5 96 17)(font "Arial" ))
//!     (pt 168 8)
//! )
//! "#).expect("parse error");
//! ```

use compact_str::CompactString;

/// Packages all top-level records of a BDF schematic, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bdf {
    /// The typed top-level records.
    pub records: Vec<BdfRecord>,
}

/// A point in schematic coordinates. Equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point(pub i32, pub i32);

/// Axis-aligned bounds of a drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BdfRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BdfRect {
    /// The top-left corner, which local `pt` offsets are relative to.
    #[inline]
    pub fn origin(&self) -> Point {
        Point(self.x1, self.y1)
    }
}

/// Generic layout node for record kinds we do not give a dedicated
/// struct. Known kinds are shaped into [BdfRecord] variants; everything
/// else is preserved opaquely as a node tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BdfNode {
    /// A bare token, e.g. `bold`.
    Atom(CompactString),
    /// An integer token, e.g. `-24`.
    Int(i64),
    /// A double-quoted string literal, without the quotes.
    Str(CompactString),
    /// A parenthesised record: kind followed by child nodes.
    Record {
        kind: CompactString,
        items: Vec<BdfNode>,
    },
}

/// Direction flag of a `pin` or `port` record, as written in the file.
///
/// Note that for primary schematic pins the electrical direction of the
/// simulated pin is the *inverse* of this flag: an `(input)` pin drives
/// its net. That inversion is downstream business, not the parser's.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BdfDirection {
    Input,
    Output,
}

/// A `font` sub-record.
#[derive(Debug, Clone, PartialEq)]
pub struct BdfFont {
    pub name: CompactString,
    pub size: Option<i32>,
}

/// A `text` record: the literal plus optional placement, font and bare
/// flags such as `bold`.
#[derive(Debug, Clone, PartialEq)]
pub struct BdfText {
    pub text: CompactString,
    pub rect: Option<BdfRect>,
    pub font: Option<BdfFont>,
    pub flags: Vec<CompactString>,
}

/// A `pin` or `port` record. Both kinds share this shape: the direction
/// flag, the bounding rect, the connection point (relative to the rect
/// origin for pins, to the owning symbol's rect origin for ports), an
/// optional stem line, the drawing block, and the text records (the
/// second text is the pin name).
#[derive(Debug, Clone, PartialEq)]
pub struct BdfPin {
    pub direction: BdfDirection,
    pub rect: Option<BdfRect>,
    pub pt: Option<Point>,
    pub line: Option<(Point, Point)>,
    pub drawing: Option<BdfNode>,
    pub texts: Vec<BdfText>,
    /// Children we do not interpret, kept for re-emission.
    pub misc: Vec<BdfNode>,
}

/// A `symbol` record: an instantiated cell. The first text is the cell
/// name, the second the instance name.
#[derive(Debug, Clone, PartialEq)]
pub struct BdfSymbol {
    pub rect: Option<BdfRect>,
    pub texts: Vec<BdfText>,
    pub ports: Vec<BdfPin>,
    pub drawing: Option<BdfNode>,
    pub misc: Vec<BdfNode>,
}

/// The file header, e.g. `(header "graphic" (version "1.4"))`.
#[derive(Debug, Clone, PartialEq)]
pub struct BdfHeader {
    pub kind: CompactString,
    pub version: CompactString,
}

/// A typed top-level record.
#[derive(Debug, Clone, PartialEq)]
pub enum BdfRecord {
    Header(BdfHeader),
    Version(CompactString),
    Pin(BdfPin),
    Symbol(BdfSymbol),
    /// A wire segment between two points.
    Connector(Point, Point),
    /// A wire junction dot.
    Junction(Point),
    /// A free-standing annotation text.
    Text(BdfText),
    /// Any record kind we do not know, preserved opaquely.
    Unknown(BdfNode),
}

mod bdfnom;
mod shape;

impl Bdf {
    /// Parses a string of BDF schematic text, and returns a [Result],
    /// indicating the parsed record list or an error string.
    #[inline]
    pub fn parse_str(s: &str) -> Result<Bdf, String> {
        Bdf::parse_u8slice(s.as_bytes())
    }

    /// Parses a u8 slice of BDF schematic text, and returns a [Result],
    /// indicating the parsed record list or an error string.
    #[inline]
    pub fn parse_u8slice(s: &[u8]) -> Result<Bdf, String> {
        let nodes = bdfnom::parse_bdf(s)?;
        let records = nodes
            .into_iter()
            .map(shape::shape_record)
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Bdf { records })
    }

    /// Parses the BDF schematic at the specific path, and returns a
    /// [Result], indicating the parsed record list or an error string.
    #[inline]
    pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Bdf, String> {
        let s = match std::fs::read(&path) {
            Ok(s) => s,
            Err(e) => return Err(format!("{}", e)),
        };
        Bdf::parse_u8slice(&s)
    }
}

mod fmt;
