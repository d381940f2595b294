//! Shaping of generic layout nodes into the known record kinds.
//!
//! Unknown record kinds are passed through untouched; a malformed
//! *known* kind is a fatal parse error, the same as bad syntax.

use super::*;

type ShapeResult<T> = Result<T, String>;

fn int_item(kind: &str, item: &BdfNode) -> ShapeResult<i64> {
    match item {
        BdfNode::Int(v) => Ok(*v),
        other => Err(format!(
            "malformed {} record: expected integer, got {:?}", kind, other)),
    }
}

/// String-ish leaf: quoted literals, bare atoms and integers all
/// stringify (the format is loose about quoting version numbers).
fn stringish(item: &BdfNode) -> Option<CompactString> {
    match item {
        BdfNode::Str(s) | BdfNode::Atom(s) => Some(s.clone()),
        BdfNode::Int(v) => Some(CompactString::from(v.to_string())),
        BdfNode::Record { .. } => None,
    }
}

fn shape_point(items: &[BdfNode]) -> ShapeResult<Point> {
    if items.len() < 2 {
        return Err(format!("malformed pt record: {} items", items.len()));
    }
    Ok(Point(int_item("pt", &items[0])? as i32,
             int_item("pt", &items[1])? as i32))
}

fn shape_rect(items: &[BdfNode]) -> ShapeResult<BdfRect> {
    if items.len() < 4 {
        return Err(format!("malformed rect record: {} items", items.len()));
    }
    Ok(BdfRect {
        x1: int_item("rect", &items[0])? as i32,
        y1: int_item("rect", &items[1])? as i32,
        x2: int_item("rect", &items[2])? as i32,
        y2: int_item("rect", &items[3])? as i32,
    })
}

/// A line is a pair of points; decorations such as `line_width` are
/// ignored.
fn shape_line(items: &[BdfNode]) -> ShapeResult<(Point, Point)> {
    let mut pts = items.iter().filter_map(|n| match n {
        BdfNode::Record { kind, items } if *kind == "pt" =>
            Some(shape_point(items)),
        _ => None,
    });
    match (pts.next(), pts.next()) {
        (Some(a), Some(b)) => Ok((a?, b?)),
        _ => Err("malformed line record: fewer than two points".into()),
    }
}

fn shape_font(items: &[BdfNode]) -> ShapeResult<BdfFont> {
    let name = items.first().and_then(stringish)
        .ok_or("malformed font record: missing name")?;
    let mut size = None;
    for item in &items[1..] {
        if let BdfNode::Record { kind, items } = item {
            if *kind == "font_size" {
                let v = items.first()
                    .ok_or("malformed font_size record: empty")?;
                size = Some(int_item("font_size", v)? as i32);
            }
        }
    }
    Ok(BdfFont { name, size })
}

fn shape_text(items: &[BdfNode]) -> ShapeResult<BdfText> {
    let text = items.first().and_then(stringish)
        .ok_or("malformed text record: missing literal")?;
    let mut out = BdfText { text, rect: None, font: None, flags: Vec::new() };
    for item in &items[1..] {
        match item {
            BdfNode::Record { kind, items } => match kind.as_str() {
                "rect" => out.rect = Some(shape_rect(items)?),
                "font" => out.font = Some(shape_font(items)?),
                _ => {}
            },
            BdfNode::Atom(flag) => out.flags.push(flag.clone()),
            _ => {}
        }
    }
    Ok(out)
}

/// Shared shape of `pin` and `port` records.
fn shape_pin(rec_kind: &str, items: Vec<BdfNode>) -> ShapeResult<BdfPin> {
    let mut out = BdfPin {
        direction: BdfDirection::Output,
        rect: None,
        pt: None,
        line: None,
        drawing: None,
        texts: Vec::new(),
        misc: Vec::new(),
    };
    for item in items {
        match &item {
            BdfNode::Record { kind, items } => match kind.as_str() {
                "input" => out.direction = BdfDirection::Input,
                "output" => out.direction = BdfDirection::Output,
                "rect" => out.rect = Some(shape_rect(items)?),
                "pt" => out.pt = Some(shape_point(items)?),
                "line" => out.line = Some(shape_line(items)?),
                "text" => out.texts.push(shape_text(items)?),
                "drawing" => out.drawing = Some(item.clone()),
                _ => out.misc.push(item.clone()),
            },
            _ => out.misc.push(item.clone()),
        }
    }
    if out.pt.is_none() && rec_kind == "port" {
        return Err("malformed port record: missing pt".into());
    }
    Ok(out)
}

fn shape_symbol(items: Vec<BdfNode>) -> ShapeResult<BdfSymbol> {
    let mut out = BdfSymbol {
        rect: None,
        texts: Vec::new(),
        ports: Vec::new(),
        drawing: None,
        misc: Vec::new(),
    };
    for item in items {
        match &item {
            BdfNode::Record { kind, items } => match kind.as_str() {
                "rect" => out.rect = Some(shape_rect(items)?),
                "text" => out.texts.push(shape_text(items)?),
                "port" => out.ports.push(shape_pin("port", items.clone())?),
                "drawing" => out.drawing = Some(item.clone()),
                _ => out.misc.push(item.clone()),
            },
            _ => out.misc.push(item.clone()),
        }
    }
    Ok(out)
}

fn shape_header(items: &[BdfNode]) -> ShapeResult<BdfHeader> {
    let kind = items.first().and_then(stringish)
        .ok_or("malformed header record: missing kind")?;
    let version = items.iter().find_map(|n| match n {
        BdfNode::Record { kind, items } if *kind == "version" =>
            items.first().and_then(stringish),
        _ => None,
    }).ok_or("malformed header record: missing version")?;
    Ok(BdfHeader { kind, version })
}

fn shape_connector(items: &[BdfNode]) -> ShapeResult<(Point, Point)> {
    shape_line(items)
        .map_err(|_| "malformed connector record: fewer than two points".into())
}

fn shape_junction(items: &[BdfNode]) -> ShapeResult<Point> {
    items.iter().find_map(|n| match n {
        BdfNode::Record { kind, items } if *kind == "pt" =>
            Some(shape_point(items)),
        _ => None,
    }).ok_or("malformed junction record: missing pt")?
}

/// Shape one top-level node into a typed record.
pub(crate) fn shape_record(node: BdfNode) -> Result<BdfRecord, String> {
    let (kind, items) = match node {
        BdfNode::Record { kind, items } => (kind, items),
        other => return Err(format!("top-level node is not a record: {:?}", other)),
    };
    Ok(match kind.as_str() {
        "header" => BdfRecord::Header(shape_header(&items)?),
        "version" => BdfRecord::Version(
            items.first().and_then(stringish)
                .ok_or("malformed version record: empty")?),
        "pin" => BdfRecord::Pin(shape_pin("pin", items)?),
        "symbol" => BdfRecord::Symbol(shape_symbol(items)?),
        "connector" => {
            let (a, b) = shape_connector(&items)?;
            BdfRecord::Connector(a, b)
        }
        "junction" => BdfRecord::Junction(shape_junction(&items)?),
        "text" => BdfRecord::Text(shape_text(&items)?),
        _ => BdfRecord::Unknown(BdfNode::Record { kind, items }),
    })
}
