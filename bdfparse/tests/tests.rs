//! unit tests for bdfparse

use bdfparse::*;

const BDF_NOTGATE: &str = include_str!("notgate.bdf");

#[test]
fn test_notgate() {
  clilog::init_stdout_simple_trace();
  let parsed = Bdf::parse_str(BDF_NOTGATE).expect("parse error");
  println!("Parsed is: {parsed:?}");

  assert_eq!(parsed.records.len(), 9);
  match &parsed.records[0] {
    BdfRecord::Header(h) => {
      assert_eq!(h.kind, "graphic");
      assert_eq!(h.version, "1.4");
    }
    other => panic!("expected header, got {other:?}"),
  }

  let pin_a = match &parsed.records[1] {
    BdfRecord::Pin(p) => p,
    other => panic!("expected pin, got {other:?}"),
  };
  assert_eq!(pin_a.direction, BdfDirection::Input);
  assert_eq!(pin_a.rect, Some(BdfRect { x1: 16, y1: 64, x2: 184, y2: 80 }));
  assert_eq!(pin_a.pt, Some(Point(168, 8)));
  assert_eq!(pin_a.texts.len(), 2);
  assert_eq!(pin_a.texts[0].text, "INPUT");
  assert_eq!(pin_a.texts[1].text, "A");
  assert_eq!(pin_a.texts[0].font.as_ref().unwrap().size, Some(10));
  assert!(pin_a.drawing.is_some());

  let pin_y = match &parsed.records[2] {
    BdfRecord::Pin(p) => p,
    other => panic!("expected pin, got {other:?}"),
  };
  assert_eq!(pin_y.direction, BdfDirection::Output);
  assert_eq!(pin_y.pt, Some(Point(0, 8)));

  let sym = match &parsed.records[3] {
    BdfRecord::Symbol(s) => s,
    other => panic!("expected symbol, got {other:?}"),
  };
  assert_eq!(sym.texts[0].text, "NOT");
  assert_eq!(sym.texts[1].text, "inst1");
  assert_eq!(sym.ports.len(), 2);
  assert_eq!(sym.ports[0].direction, BdfDirection::Input);
  assert_eq!(sym.ports[0].pt, Some(Point(0, 24)));
  assert_eq!(sym.ports[0].texts[1].text, "IN");
  // line decorations such as line_width are dropped, the points stay
  assert_eq!(sym.ports[0].line, Some((Point(0, 24), Point(16, 24))));
  assert_eq!(sym.ports[1].direction, BdfDirection::Output);
  assert_eq!(sym.ports[1].pt, Some(Point(64, 24)));

  assert_eq!(parsed.records[4],
             BdfRecord::Connector(Point(184, 72), Point(248, 72)));
  assert_eq!(parsed.records[8], BdfRecord::Junction(Point(248, 72)));
}

#[test]
fn test_reemit_roundtrip() {
  clilog::init_stdout_simple_trace();
  let parsed = Bdf::parse_str(BDF_NOTGATE).expect("parse error");
  let reemitted = format!("{parsed}");
  println!("Restructure: \n{reemitted}");
  let reparsed = Bdf::parse_str(&reemitted).expect("reparse error");
  assert_eq!(parsed, reparsed);
}

#[test]
fn test_annotations_and_unknown_records() {
  clilog::init_stdout_simple_trace();
  let parsed = Bdf::parse_str(r#"
(header "graphic" (version "1.4"))
(text "Half adder demo" (rect 16 16 140 28)(font "Arial" (font_size 10)) bold)
(annotation (rect 0 0 8 8) "ignore me")
(junction (pt 248 112))
"#).expect("parse error");

  assert_eq!(parsed.records.len(), 4);
  match &parsed.records[1] {
    BdfRecord::Text(t) => {
      assert_eq!(t.text, "Half adder demo");
      assert_eq!(t.flags, vec!["bold"]);
    }
    other => panic!("expected text, got {other:?}"),
  }
  match &parsed.records[2] {
    BdfRecord::Unknown(BdfNode::Record { kind, items }) => {
      assert_eq!(*kind, "annotation");
      assert_eq!(items.len(), 2);
    }
    other => panic!("expected opaque record, got {other:?}"),
  }

  // unknown records survive re-emission
  let reparsed = Bdf::parse_str(&format!("{parsed}")).expect("reparse error");
  assert_eq!(parsed, reparsed);
}

#[test]
fn test_malformed_inputs() {
  clilog::init_stdout_simple_trace();
  // unbalanced parens
  assert!(Bdf::parse_str("(pin (input)").is_err());
  // truncated string literal
  assert!(Bdf::parse_str("(text \"oops)").is_err());
  // garbage outside any record
  assert!(Bdf::parse_str("(junction (pt 0 0)) stray").is_err());
  // malformed known record kinds are fatal, not opaque
  assert!(Bdf::parse_str("(connector (pt 0 0))").is_err());
  assert!(Bdf::parse_str("(pin (rect 1 2 3))").is_err());
}

#[test]
fn test_comments_and_whitespace() {
  let parsed = Bdf::parse_str(
    "/* a */ (junction /* b */ (pt 1 -2)) /* trailing */"
  ).expect("parse error");
  assert_eq!(parsed.records, vec![BdfRecord::Junction(Point(1, -2))]);
}
