use super::*;
use std::fmt;
use std::str::FromStr;
use nom::{
    IResult,
    combinator::{ value, map, cut },
    branch::alt,
    multi::many0,
    sequence::{ delimited, pair, preceded, terminated, tuple },
    // we do not plan to stream schematics. so we
    // only include completes.
    character::complete::{ char, multispace0 },
    bytes::complete::{ tag, take_until, take_till, take_till1 },
};

fn u82str_unsafe(i: &[u8]) -> &str {
    unsafe { std::str::from_utf8_unchecked(i) }
}

/// comment: starts with /* and ends with */. BDF has no line comments.
/// do not use streaming operators here.
pub fn skip_whitespace_and_comment(mut i: &[u8]) -> IResult<&[u8], ()> {
    (i, _) = multispace0(i)?;
    while i.len() > 0 && i[0] == b'/' {
        i = match value((), tuple((
            tag("/*"), take_until("*/"), tag("*/")
        )))(i) as IResult<&[u8], ()> {
            Ok((i, ())) => i,
            Err(_) => break
        };
        (i, _) = multispace0(i)?;
    }
    Ok((i, ()))
}

/// a higher-order parser transforming a parser to one that
/// eats up all spaces.
pub fn ws<'a, F, O>(inner: F) ->
impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>
where F: FnMut(&'a [u8]) -> IResult<&'a [u8], O> {
    delimited(skip_whitespace_and_comment,
              inner,
              skip_whitespace_and_comment)
}

/// Parse a double-quoted string literal. The format never escapes
/// quotes inside literals, so everything up to the closing quote is
/// the content.
fn string(i: &[u8]) -> IResult<&[u8], CompactString> {
    map(delimited(
        char('"'),
        take_till(|c| c == b'"'),
        cut(char('"'))
    ), |s| CompactString::from(u82str_unsafe(s)))(i)
}

/// Parse a bare token: anything up to whitespace, parens or a quote.
fn token(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till1(|c| matches!(
        c, b'(' | b')' | b'"' | b' ' | b'\t' | b'\r' | b'\n'
    ))(i)
}

/// Integer tokens like `-24` become [BdfNode::Int]; everything else,
/// including non-integer numeric-looking leaves, stays an atom.
fn classify_token(t: &[u8]) -> BdfNode {
    let digits = match t {
        [b'-', rest @ ..] => rest,
        _ => t,
    };
    if !digits.is_empty() && digits.iter().all(|c| c.is_ascii_digit()) {
        BdfNode::Int(i64::from_str(u82str_unsafe(t)).unwrap())
    } else {
        BdfNode::Atom(CompactString::from(u82str_unsafe(t)))
    }
}

fn node(i: &[u8]) -> IResult<&[u8], BdfNode> {
    alt((
        record,
        map(string, BdfNode::Str),
        map(token, classify_token),
    ))(i)
}

/// A parenthesised record: `( kind item* )`. The kind is always a bare
/// token; items nest arbitrarily.
fn record(i: &[u8]) -> IResult<&[u8], BdfNode> {
    map(preceded(
        char('('),
        cut(terminated(
            pair(
                ws(map(token, |t| CompactString::from(u82str_unsafe(t)))),
                many0(ws(node))
            ),
            char(')')
        ))
    ), |(kind, items)| BdfNode::Record { kind, items })(i)
}

/// a `Display`able parsing error type, which prints at most
/// 50 characters after the error position.
pub(crate) struct ParseError {
    code: nom::error::ErrorKind,
    partial_input: String
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for ParseError {
    fn from(e: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match e {
            nom::Err::Incomplete(_) => ParseError {
                code: nom::error::ErrorKind::Fail,
                partial_input: "<incomplete>".into()
            },
            nom::Err::Error(e) | nom::Err::Failure(e) => ParseError {
                code: e.code,
                partial_input: String::from_utf8_lossy(
                    &e.input[..e.input.len().min(50)])
                    .to_string()
            }
        }
    }
}

impl From<ParseError> for String {
    fn from(e: ParseError) -> String {
        format!("{}", e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {:?} at: {}",
               self.code,
               self.partial_input)
    }
}

/// Parse a whole file into the generic top-level node list.
pub(crate) fn parse_bdf(i: &[u8]) -> Result<Vec<BdfNode>, String> {
    let (rem, nodes) = many0(ws(record))(i)
        .map_err(|e| String::from(ParseError::from(e)))?;
    let (rem, ()) = skip_whitespace_and_comment(rem)
        .map_err(|e| String::from(ParseError::from(e)))?;
    if rem.len() > 0 {
        return Err(ParseError {
            code: nom::error::ErrorKind::Complete,
            partial_input: String::from_utf8_lossy(
                &rem[..rem.len().min(50)]).to_string()
        }.into())
    }
    Ok(nodes)
}

#[test]
fn test_tokens() {
    assert_eq!(classify_token(b"-24"), BdfNode::Int(-24));
    assert_eq!(classify_token(b"168"), BdfNode::Int(168));
    assert_eq!(classify_token(b"1.4"),
               BdfNode::Atom(CompactString::from("1.4")));
    assert_eq!(classify_token(b"bold"),
               BdfNode::Atom(CompactString::from("bold")));
}
