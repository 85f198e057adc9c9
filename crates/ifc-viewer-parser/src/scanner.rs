// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fast entity scanner and header reader
//!
//! Finds entity boundaries in the DATA section with memchr, without decoding
//! attributes.

use crate::tokenizer::parse_header_record;
use ifc_viewer_model::{AttributeValue, ParseError, Result};
use memchr::{memchr, memchr2};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::ops::Range;

/// STEP exchange structure magic
pub const STEP_MAGIC: &str = "ISO-10303-21;";

const DATA_MARKER: &str = "DATA;";

/// Byte span of every entity record, keyed by its `#id`
pub type EntityIndex = FxHashMap<u32, Range<usize>>;

/// One `#id=TYPE(...);` record located in the DATA section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEntity<'a> {
    pub id: u32,
    /// Type name as written (not case-normalised)
    pub type_name: &'a str,
    /// From the `#` up to and including the closing `;`
    pub span: Range<usize>,
}

/// Iterates over the entity records of a STEP file
///
/// Attributes are not decoded. Only record boundaries are found.
pub struct EntityScanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> EntityScanner<'a> {
    /// Start just after `DATA;`, or at the beginning when there is none
    pub fn new(text: &'a str) -> Self {
        let cursor = text
            .find(DATA_MARKER)
            .map_or(0, |at| at + DATA_MARKER.len());
        Self { text, cursor }
    }

    /// Index every record by id; later duplicates win
    pub fn build_index(text: &'a str) -> EntityIndex {
        Self::new(text).map(|raw| (raw.id, raw.span)).collect()
    }

    /// Record count per upper-cased type name
    pub fn count_by_type(text: &'a str) -> FxHashMap<String, usize> {
        Self::new(text).fold(FxHashMap::default(), |mut counts, raw| {
            *counts
                .entry(raw.type_name.to_ascii_uppercase())
                .or_default() += 1;
            counts
        })
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    /// Advance over bytes matching `accept`, returning the consumed slice
    fn eat_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let from = self.cursor;
        let len = self.bytes()[from..]
            .iter()
            .take_while(|&&b| accept(b))
            .count();
        self.cursor += len;
        &self.text[from..self.cursor]
    }

    /// A `#` only opens a record at the start of a line or after a `;`.
    /// Anywhere else it is a reference inside an attribute list.
    fn at_record_start(&self, at: usize) -> bool {
        self.bytes()[..at]
            .iter()
            .rev()
            .find(|b| !matches!(b, b' ' | b'\t'))
            .map_or(true, |b| matches!(b, b'\n' | b'\r' | b';'))
    }

    /// Move past the `;` that closes the current record, ignoring any inside
    /// quoted strings (a doubled quote is an escaped quote and cancels out)
    fn close_record(&mut self) -> Option<usize> {
        let mut quoted = false;
        loop {
            let hit = self.cursor + memchr2(b'\'', b';', &self.bytes()[self.cursor..])?;
            self.cursor = hit + 1;
            match self.bytes()[hit] {
                b'\'' => quoted = !quoted,
                _ if !quoted => return Some(self.cursor),
                _ => {}
            }
        }
    }

    /// Parse `#<digits> = <TYPE>` at the cursor, which sits on a `#`
    fn record_head(&mut self) -> Option<(u32, &'a str)> {
        self.cursor += 1;
        let id = self.eat_while(|b| b.is_ascii_digit()).parse().ok()?;
        self.eat_while(|b| matches!(b, b' ' | b'\t'));
        if self.bytes().get(self.cursor) != Some(&b'=') {
            return None;
        }
        self.cursor += 1;
        self.eat_while(|b| matches!(b, b' ' | b'\t'));
        let type_name = self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        (!type_name.is_empty()).then_some((id, type_name))
    }
}

impl<'a> Iterator for EntityScanner<'a> {
    type Item = RawEntity<'a>;

    fn next(&mut self) -> Option<RawEntity<'a>> {
        loop {
            let start = self.cursor + memchr(b'#', self.bytes().get(self.cursor..)?)?;
            self.cursor = start;
            if !self.at_record_start(start) {
                self.cursor += 1;
                continue;
            }
            if let Some((id, type_name)) = self.record_head() {
                let end = self.close_record()?;
                return Some(RawEntity {
                    id,
                    type_name,
                    span: start..end,
                });
            }
        }
    }
}

/// Header information extracted from a STEP file
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HeaderInfo {
    pub description: Vec<String>,
    pub schema_version: String,
    pub file_name: Option<String>,
    pub timestamp: Option<String>,
    pub author: Option<String>,
    pub organization: Option<String>,
    pub preprocessor_version: Option<String>,
    pub originating_system: Option<String>,
}

/// Read the HEADER section
///
/// Requires the STEP magic, a `HEADER;` section closed by `ENDSEC;`, and a
/// `FILE_SCHEMA` record. Other records are optional.
pub fn parse_header(content: &str) -> Result<HeaderInfo> {
    if !content.trim_start().starts_with(STEP_MAGIC) {
        return Err(ParseError::format("missing ISO-10303-21 signature"));
    }

    let header_start = content
        .find("HEADER;")
        .ok_or_else(|| ParseError::header("no HEADER section"))?
        + "HEADER;".len();
    let header_len = content[header_start..]
        .find("ENDSEC;")
        .ok_or_else(|| ParseError::header("HEADER section is not closed"))?;
    let header = &content[header_start..header_start + header_len];

    let mut info = HeaderInfo::default();
    let mut has_schema = false;

    for record in split_records(header) {
        let (name, args) = parse_header_record(record).map_err(ParseError::header)?;
        match name.as_str() {
            "FILE_DESCRIPTION" => {
                info.description = strings(args.first());
            }
            "FILE_NAME" => {
                let text = |i: usize| {
                    args.get(i)
                        .and_then(|v| v.as_string())
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                info.file_name = text(0);
                info.timestamp = text(1);
                info.author = strings(args.get(2)).into_iter().next();
                info.organization = strings(args.get(3)).into_iter().next();
                info.preprocessor_version = text(4);
                info.originating_system = text(5);
            }
            "FILE_SCHEMA" => {
                info.schema_version = strings(args.first())
                    .into_iter()
                    .next()
                    .ok_or_else(|| ParseError::header("FILE_SCHEMA lists no schema"))?;
                has_schema = true;
            }
            other => log::debug!("[Parser] Ignoring header record {other}"),
        }
    }

    if !has_schema {
        return Err(ParseError::header("missing FILE_SCHEMA"));
    }

    Ok(info)
}

/// Split header text into `;`-terminated records, respecting quotes
fn split_records(header: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_string = false;
    let mut start = 0;

    for (i, b) in header.bytes().enumerate() {
        match b {
            b'\'' => in_string = !in_string,
            b';' if !in_string => {
                let record = header[start..i].trim();
                if !record.is_empty() {
                    records.push(record);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    records
}

/// Non-empty strings of a list attribute
fn strings(value: Option<&AttributeValue>) -> Vec<String> {
    value
        .and_then(|v| v.as_list())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_string())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('test.ifc','2024-01-01T00:00:00',('Author'),('Org'),'Preprocessor','App','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCPROJECT('guid',$,'Project',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#4=IFCWALL('guid;with;semicolons',$,'Wall 1',$,$,#5,#6,$);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_scanner_yields_records_in_file_order() {
        let found: Vec<(u32, &str)> = EntityScanner::new(TEST_IFC)
            .map(|raw| (raw.id, raw.type_name))
            .collect();
        assert_eq!(
            found,
            vec![
                (1, "IFCPROJECT"),
                (2, "IFCUNITASSIGNMENT"),
                (3, "IFCSIUNIT"),
                (4, "IFCWALL"),
            ]
        );
    }

    #[test]
    fn test_span_ignores_semicolons_in_strings() {
        let index = EntityScanner::build_index(TEST_IFC);
        let record = &TEST_IFC[index[&4].clone()];
        assert!(record.starts_with("#4=IFCWALL("));
        assert!(record.ends_with("$);"));
    }

    #[test]
    fn test_escaped_quotes_and_spacing() {
        let text = "DATA;\n#7 = IfcWall('it''s; fine',#8);\n  #8= IFCDOOR($);\n";
        let found: Vec<RawEntity> = EntityScanner::new(text).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].type_name, "IfcWall");
        assert!(text[found[0].span.clone()].ends_with("#8);"));
        assert_eq!(found[1].id, 8);
    }

    #[test]
    fn test_count_by_type_normalises_case() {
        let counts = EntityScanner::count_by_type("DATA;\n#1=IfcWall();\n#2=IFCWALL();\n");
        assert_eq!(counts.get("IFCWALL"), Some(&2));
    }

    #[test]
    fn test_parse_header() {
        let info = parse_header(TEST_IFC).unwrap();
        assert_eq!(info.schema_version, "IFC2X3");
        assert_eq!(info.file_name.as_deref(), Some("test.ifc"));
        assert_eq!(info.author.as_deref(), Some("Author"));
        assert_eq!(info.organization.as_deref(), Some("Org"));
        assert_eq!(info.originating_system.as_deref(), Some("App"));
        assert_eq!(info.description, vec!["ViewDefinition [CoordinationView]"]);
    }

    #[test]
    fn test_header_requires_magic_and_schema() {
        assert!(matches!(
            parse_header("not a step file"),
            Err(ParseError::InvalidFormat(_))
        ));

        let no_schema = "ISO-10303-21;\nHEADER;\nFILE_NAME('a','b',(''),(''),'','','');\nENDSEC;\n";
        assert!(matches!(
            parse_header(no_schema),
            Err(ParseError::InvalidHeader(_))
        ));
    }
}
