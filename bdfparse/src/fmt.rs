//! Re-emission of parsed schematics as BDF text.
//!
//! The output is re-parseable but not byte-identical to the input:
//! child order inside pin and symbol records is normalized.

use std::fmt;
use std::fmt::Write;
use itertools::Itertools;

use super::*;

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(pt {} {})", self.0, self.1)
    }
}

impl fmt::Display for BdfRect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(rect {} {} {} {})", self.x1, self.y1, self.x2, self.y2)
    }
}

impl fmt::Display for BdfNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BdfNode::*;
        match self {
            Atom(s) => write!(f, "{}", s),
            Int(v) => write!(f, "{}", v),
            Str(s) => write!(f, "\"{}\"", s),
            Record { kind, items } => match items.is_empty() {
                true => write!(f, "({})", kind),
                false => write!(f, "({} {})", kind, items.iter().format(" ")),
            }
        }
    }
}

impl fmt::Display for BdfFont {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.size {
            Some(size) => write!(f, "(font \"{}\" (font_size {}))",
                                 self.name, size),
            None => write!(f, "(font \"{}\" )", self.name),
        }
    }
}

impl fmt::Display for BdfText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(text \"{}\"", self.text)?;
        if let Some(rect) = &self.rect {
            write!(f, " {}", rect)?;
        }
        if let Some(font) = &self.font {
            write!(f, "{}", font)?;
        }
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        write!(f, ")")
    }
}

fn direction_flag(d: BdfDirection) -> &'static str {
    match d {
        BdfDirection::Input => "input",
        BdfDirection::Output => "output",
    }
}

fn fmt_pin<W: Write>(f: &mut W, pin: &BdfPin, kind: &str) -> fmt::Result {
    writeln!(f, "({}", kind)?;
    {
        let mut ind = indenter::indented(f)
            .with_format(indenter::Format::Uniform { indentation: "\t" });
        writeln!(ind, "({})", direction_flag(pin.direction))?;
        if let Some(rect) = &pin.rect {
            writeln!(ind, "{}", rect)?;
        }
        for text in &pin.texts {
            writeln!(ind, "{}", text)?;
        }
        if let Some(pt) = &pin.pt {
            writeln!(ind, "{}", pt)?;
        }
        if let Some((a, b)) = &pin.line {
            writeln!(ind, "(line {}{})", a, b)?;
        }
        if let Some(drawing) = &pin.drawing {
            writeln!(ind, "{}", drawing)?;
        }
        for misc in &pin.misc {
            writeln!(ind, "{}", misc)?;
        }
    }
    write!(f, ")")
}

impl fmt::Display for BdfPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_pin(f, self, "pin")
    }
}

impl fmt::Display for BdfSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "(symbol")?;
        {
            let mut ind = indenter::indented(f)
                .with_format(indenter::Format::Uniform { indentation: "\t" });
            if let Some(rect) = &self.rect {
                writeln!(ind, "{}", rect)?;
            }
            for text in &self.texts {
                writeln!(ind, "{}", text)?;
            }
            for port in &self.ports {
                fmt_pin(&mut ind, port, "port")?;
                writeln!(ind)?;
            }
            if let Some(drawing) = &self.drawing {
                writeln!(ind, "{}", drawing)?;
            }
            for misc in &self.misc {
                writeln!(ind, "{}", misc)?;
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for BdfRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BdfRecord::*;
        match self {
            Header(h) => write!(f, "(header \"{}\" (version \"{}\"))",
                                h.kind, h.version),
            Version(v) => write!(f, "(version \"{}\")", v),
            Pin(p) => write!(f, "{}", p),
            Symbol(s) => write!(f, "{}", s),
            Connector(a, b) => write!(f, "(connector {} {})", a, b),
            Junction(p) => write!(f, "(junction {})", p),
            Text(t) => write!(f, "{}", t),
            Unknown(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Bdf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
