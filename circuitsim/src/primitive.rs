//! Fixed catalogue of combinational and sequential primitives.
//!
//! Each primitive is a pure function from input pin values to output
//! pin values; only the D-flip-flop carries state between steps.

use crate::Pin;

/// Stored state of a D-flip-flop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DffState {
    internal_state: u8,
    prev_clk: u8,
}

/// A hard-coded logic cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    Not,
    And2,
    And3,
    Nand2,
    Nand3,
    Or2,
    Or3,
    Or4,
    Or6,
    Or8,
    Dff(DffState),
}

#[inline]
fn vcc(inputs: &[Pin], name: &str) -> u8 {
    vcc_or(inputs, name, 0)
}

/// An absent input pin reads `default`; an undriven one reads 0.
#[inline]
fn vcc_or(inputs: &[Pin], name: &str, default: u8) -> u8 {
    inputs.iter().find(|p| p.name == name).map(|p| p.vcc).unwrap_or(default)
}

#[inline]
fn drive(outputs: &mut [Pin], name: &str, v: u8) {
    if let Some(pin) = outputs.iter_mut().find(|p| p.name == name) {
        pin.vcc = v;
    }
}

impl Primitive {
    /// Resolve a symbol cell name into a primitive.
    pub fn lookup(cell: &str) -> Option<Primitive> {
        use Primitive::*;
        Some(match cell {
            "NOT" => Not,
            "AND2" => And2,
            "AND3" => And3,
            "NAND2" => Nand2,
            "NAND3" => Nand3,
            "OR2" => Or2,
            "OR3" => Or3,
            "OR4" => Or4,
            "OR6" => Or6,
            "OR8" => Or8,
            "DFF" => Dff(DffState::default()),
            _ => return None,
        })
    }

    /// Compute the output pin values from the input pin values.
    pub fn evaluate(&mut self, inputs: &[Pin], outputs: &mut [Pin]) {
        use Primitive::*;
        match self {
            Not => drive(outputs, "OUT", 1 - vcc(inputs, "IN")),
            And2 => drive(outputs, "OUT",
                          vcc(inputs, "IN1") * vcc(inputs, "IN2")),
            And3 => drive(outputs, "OUT",
                          vcc(inputs, "IN1") * vcc(inputs, "IN2")
                          * vcc(inputs, "IN3")),
            Nand2 => drive(outputs, "OUT",
                           1 - vcc(inputs, "IN1") * vcc(inputs, "IN2")),
            Nand3 => drive(outputs, "OUT",
                           1 - vcc(inputs, "IN1") * vcc(inputs, "IN2")
                           * vcc(inputs, "IN3")),
            Or2 | Or3 | Or4 | Or6 | Or8 => drive(
                outputs, "OUT",
                inputs.iter().map(|p| p.vcc).sum::<u8>().min(1)),
            Dff(state) => {
                let d = vcc(inputs, "D");
                let clk = vcc(inputs, "CLK");
                // active-low async controls. a symbol without the port
                // reads the inactive level.
                let clrn = vcc_or(inputs, "CLRN", 1);
                let prn = vcc_or(inputs, "PRN", 1);

                if clrn == 0 {
                    state.internal_state = 0;
                } else if prn == 0 {
                    state.internal_state = 1;
                } else if state.prev_clk == 0 && clk == 1 {
                    state.internal_state = d;
                }

                drive(outputs, "Q", state.internal_state);

                // store clock for the next edge detect
                state.prev_clk = clk;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Point};

    fn input_pins(values: &[(&str, u8)]) -> Vec<Pin> {
        values.iter().map(|(name, v)| {
            let mut pin = Pin::new((*name).into(), Direction::I, Point(0, 0));
            pin.vcc = *v;
            pin
        }).collect()
    }

    fn eval(prim: &mut Primitive, inputs: &[(&str, u8)], out: &str) -> u8 {
        let inputs = input_pins(inputs);
        let mut outputs = vec![
            Pin::new(out.into(), Direction::O, Point(0, 0))
        ];
        prim.evaluate(&inputs, &mut outputs);
        outputs[0].vcc
    }

    #[test]
    fn gate_identities() {
        for a in 0..2u8 {
            assert_eq!(eval(&mut Primitive::Not, &[("IN", a)], "OUT"), 1 - a);
            for b in 0..2u8 {
                assert_eq!(eval(&mut Primitive::And2,
                                &[("IN1", a), ("IN2", b)], "OUT"), a * b);
                assert_eq!(eval(&mut Primitive::Nand2,
                                &[("IN1", a), ("IN2", b)], "OUT"), 1 - a * b);
                assert_eq!(eval(&mut Primitive::Or2,
                                &[("IN1", a), ("IN2", b)], "OUT"),
                           (a + b).min(1));
                for c in 0..2u8 {
                    assert_eq!(eval(&mut Primitive::And3,
                                    &[("IN1", a), ("IN2", b), ("IN3", c)],
                                    "OUT"), a * b * c);
                    assert_eq!(eval(&mut Primitive::Nand3,
                                    &[("IN1", a), ("IN2", b), ("IN3", c)],
                                    "OUT"), 1 - a * b * c);
                }
            }
        }
        // wide ORs saturate over every input pin
        assert_eq!(eval(&mut Primitive::Or8,
                        &[("IN1", 0), ("IN2", 0), ("IN3", 1), ("IN4", 1),
                          ("IN5", 0), ("IN6", 0), ("IN7", 0), ("IN8", 1)],
                        "OUT"), 1);
        assert_eq!(eval(&mut Primitive::Or4,
                        &[("IN1", 0), ("IN2", 0), ("IN3", 0), ("IN4", 0)],
                        "OUT"), 0);
    }

    #[test]
    fn undriven_inputs_read_zero() {
        assert_eq!(eval(&mut Primitive::And2, &[("IN1", 1)], "OUT"), 0);
        assert_eq!(eval(&mut Primitive::Not, &[], "OUT"), 1);
    }

    #[test]
    fn dff_rising_edge_capture() {
        let mut dff = Primitive::lookup("DFF").unwrap();
        // clock low, D high: nothing captured
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 0)], "Q"), 0);
        // rising edge captures D
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 1)], "Q"), 1);
        // D changes while clock stays high: held
        assert_eq!(eval(&mut dff, &[("D", 0), ("CLK", 1)], "Q"), 1);
        // falling edge: held
        assert_eq!(eval(&mut dff, &[("D", 0), ("CLK", 0)], "Q"), 1);
        // next rising edge captures the new D
        assert_eq!(eval(&mut dff, &[("D", 0), ("CLK", 1)], "Q"), 0);
    }

    #[test]
    fn dff_async_priority() {
        // clear beats preset beats the clock edge
        let mut dff = Primitive::lookup("DFF").unwrap();
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 0)], "Q"), 0);
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 1),
                                    ("CLRN", 0), ("PRN", 0)], "Q"), 0);

        let mut dff = Primitive::lookup("DFF").unwrap();
        assert_eq!(eval(&mut dff, &[("D", 0), ("CLK", 0)], "Q"), 0);
        assert_eq!(eval(&mut dff, &[("D", 0), ("CLK", 1),
                                    ("CLRN", 1), ("PRN", 0)], "Q"), 1);

        // both inactive: plain edge behavior
        let mut dff = Primitive::lookup("DFF").unwrap();
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 0),
                                    ("CLRN", 1), ("PRN", 1)], "Q"), 0);
        assert_eq!(eval(&mut dff, &[("D", 1), ("CLK", 1),
                                    ("CLRN", 1), ("PRN", 1)], "Q"), 1);
    }

    #[test]
    fn unknown_primitive_name() {
        assert!(Primitive::lookup("XOR2").is_none());
        assert!(Primitive::lookup("HALFADD").is_none());
    }
}
