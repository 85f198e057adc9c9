// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP tokenizer using nom combinators
//!
//! Parses entity definitions (`#12=IFCWALL(...);`) and header records
//! (`FILE_NAME(...);`) into tokens.

use ifc_viewer_model::{AttributeValue, DecodedEntity, EntityId, IfcType};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{map, map_res, opt, recognize, value},
    multi::{many0, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

/// Raw token borrowed from the source text
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// Entity reference (#123)
    EntityRef(u32),
    /// String value, still escaped ('' for a quote)
    String(&'a str),
    Integer(i64),
    Float(f64),
    /// Enumeration (.VALUE.)
    Enum(&'a str),
    List(Vec<Token<'a>>),
    /// Typed value like IFCLABEL('text')
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value ($)
    Null,
    /// Derived value (*)
    Derived,
}

impl Token<'_> {
    /// Convert token to owned AttributeValue
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Token::EntityRef(id) => AttributeValue::EntityRef(EntityId(*id)),
            Token::String(s) => AttributeValue::String(unescape(s)),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(s) => AttributeValue::Enum((*s).to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(|t| t.to_attribute_value()).collect())
            }
            Token::TypedValue(name, args) => AttributeValue::TypedValue(
                (*name).to_ascii_uppercase(),
                args.iter().map(|t| t.to_attribute_value()).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }
}

fn unescape(s: &str) -> String {
    if s.contains("''") {
        s.replace("''", "'")
    } else {
        s.to_string()
    }
}

// ============================================================================
// Parsing Primitives
// ============================================================================

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

/// Whitespace and /* */ comments
fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, block_comment)))).parse(input)
}

fn entity_ref(input: &str) -> IResult<&str, Token<'_>> {
    map(
        preceded(
            char('#'),
            map_res(digit1, |d: &str| lexical_core::parse::<u32>(d.as_bytes())),
        ),
        Token::EntityRef,
    )
    .parse(input)
}

/// Quoted string, body kept escaped; an unterminated string is an error
fn step_string(input: &str) -> IResult<&str, Token<'_>> {
    map(
        delimited(
            char('\''),
            recognize(many0(alt((is_not("'"), tag("''"))))),
            char('\''),
        ),
        Token::String,
    )
    .parse(input)
}

/// Integer unless the literal has a fraction or exponent
fn number(input: &str) -> IResult<&str, Token<'_>> {
    map_res(recognize_float, |text: &str| {
        let digits = text.trim_start_matches('+').as_bytes();
        if text.contains(['.', 'e', 'E']) {
            lexical_core::parse(digits).map(Token::Float)
        } else {
            lexical_core::parse(digits).map(Token::Integer)
        }
    })
    .parse(input)
}

fn enumeration(input: &str) -> IResult<&str, Token<'_>> {
    map(delimited(char('.'), keyword, char('.')), Token::Enum).parse(input)
}

fn null_value(input: &str) -> IResult<&str, Token<'_>> {
    value(Token::Null, char('$')).parse(input)
}

fn derived_value(input: &str) -> IResult<&str, Token<'_>> {
    value(Token::Derived, char('*')).parse(input)
}

/// Parenthesised, comma separated tokens
fn token_list(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    delimited(
        pair(char('('), ws),
        separated_list0((ws, char(','), ws), token),
        pair(ws, char(')')),
    )
    .parse(input)
}

fn list(input: &str) -> IResult<&str, Token<'_>> {
    map(token_list, Token::List).parse(input)
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Wrapped value such as `IFCLABEL('text')`
fn typed_value(input: &str) -> IResult<&str, Token<'_>> {
    map((keyword, ws, token_list), |(name, _, args)| {
        Token::TypedValue(name, args)
    })
    .parse(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        entity_ref,
        step_string,
        null_value,
        derived_value,
        enumeration,
        number,
        list,
        typed_value,
    ))
    .parse(input)
}

// ============================================================================
// Record Parsing
// ============================================================================

/// Parse a complete entity definition
///
/// Format: `#123=IFCWALL(attr1,attr2,...);`
pub fn parse_entity(input: &str) -> Result<DecodedEntity, String> {
    let mut record = (
        ws,
        char('#'),
        take_while1(|c: char| c.is_ascii_digit()),
        ws,
        char('='),
        ws,
        keyword,
        ws,
        token_list,
        ws,
        opt(char(';')),
    );

    let (_, (_, _, id_str, _, _, _, type_name, _, tokens, _, _)) = record
        .parse(input)
        .map_err(|e: nom::Err<nom::error::Error<&str>>| format!("malformed entity: {e}"))?;

    let id: u32 = id_str
        .parse()
        .map_err(|_| format!("invalid entity id '{id_str}'"))?;

    Ok(DecodedEntity {
        id: EntityId(id),
        ifc_type: IfcType::parse(type_name),
        attributes: tokens.iter().map(|t| t.to_attribute_value()).collect(),
    })
}

/// Parse a header record such as `FILE_SCHEMA(('IFC4'));`
///
/// Returns the upper-cased record name and its arguments.
pub fn parse_header_record(input: &str) -> Result<(String, Vec<AttributeValue>), String> {
    let (_, (_, name, _, tokens)) = (ws, keyword, ws, token_list)
        .parse(input)
        .map_err(|e: nom::Err<nom::error::Error<&str>>| format!("malformed header record: {e}"))?;

    Ok((
        name.to_ascii_uppercase(),
        tokens.iter().map(|t| t.to_attribute_value()).collect(),
    ))
}
