//! Revision-Three interchange format
//!
//! Reads and writes the standard JSON source map document:
//!
//! ```json
//! {
//!   "version": 3,
//!   "file": "out.js",
//!   "sources": ["a.src", "b.src"],
//!   "names": ["main"],
//!   "mappings": "A,SAAA;SCAAA"
//! }
//! ```
//!
//! `mappings` holds one `;`-separated group per generated line and one
//! `,`-separated segment per entry. Segment fields are VLQ deltas: generated
//! column (relative within the line), then source index, original line,
//! original column and name index (relative across the whole map).
//! Lines and columns are 0-based on the wire and 1-based in [`Position`].
//!
//! Extension data travels in additional fields, see [`ExtensionCodec`].

mod caller;
mod extension;

pub use extension::{ExtensionCodec, ExtensionSetCodec, NameTable};

use crate::data::Data;
use crate::entry::Entry;
use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::extension::ExtensionSet;
use crate::mapping::Mapping;
use crate::position::{FilePosition, Position};
use crate::vlq;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The format version written and accepted by this codec
pub const VERSION: u64 = 3;

/// A Revision-Three source map document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionThree {
    version: u64,
    #[serde(default)]
    file: String,
    #[serde(rename = "sourceRoot", default, skip_serializing_if = "Option::is_none")]
    source_root: Option<String>,
    sources: Vec<String>,
    #[serde(default)]
    names: Vec<String>,
    mappings: String,
    /// Extension fields and any other fields, carried verbatim
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Default for RevisionThree {
    fn default() -> Self {
        RevisionThree::new()
    }
}

impl RevisionThree {
    pub fn new() -> Self {
        RevisionThree {
            version: VERSION,
            file: String::new(),
            source_root: None,
            sources: Vec::new(),
            names: Vec::new(),
            mappings: String::new(),
            fields: Map::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Name of the generated file
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn store_file(&mut self, file: impl Into<String>) {
        self.file = file.into();
    }

    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    pub fn store_source_root(&mut self, root: impl Into<String>) {
        self.source_root = Some(root.into());
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn mappings(&self) -> &str {
        &self.mappings
    }

    /// A raw additional field, such as an extension's side channel
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Replace sources, names, mappings and extension fields with the
    /// encoding of `mapping`
    pub fn encode_mappings<X: ExtensionSetCodec>(
        &mut self,
        mapping: &Mapping<X>,
    ) -> EncodeResult<()> {
        let mut sources = NameTable::default();
        let mut names = NameTable::default();
        let mut mappings = String::new();

        let mut line = 1;
        let mut line_started = false;
        let mut previous = Segment::default();

        for (index, entry) in mapping.entries().iter().enumerate() {
            let generated = entry.generated;
            if !generated.is_valid() || generated.line == 0 {
                return Err(EncodeError::InvalidGenerated {
                    index,
                    position: generated,
                });
            }

            while line < generated.line {
                mappings.push(';');
                line += 1;
                line_started = false;
                previous.generated_column = 0;
            }
            if line_started {
                mappings.push(',');
            }
            line_started = true;

            let column = i64::from(generated.column) - 1;
            vlq::encode(column - previous.generated_column, &mut mappings);
            previous.generated_column = column;

            if !entry.has_original() {
                if let Some(name) = entry.name() {
                    tracing::warn!(
                        generated = %generated,
                        name,
                        "Dropping symbol name of entry without original position"
                    );
                }
                continue;
            }

            let original = &entry.original;
            let source = sources.index_of(&original.name) as i64;
            let original_line = i64::from(original.line()) - 1;
            let original_column = i64::from(original.column()) - 1;
            vlq::encode_segment(
                &[
                    source - previous.source,
                    original_line - previous.original_line,
                    original_column - previous.original_column,
                ],
                &mut mappings,
            );
            previous.source = source;
            previous.original_line = original_line;
            previous.original_column = original_column;

            if let Some(name) = entry.name() {
                let name = names.index_of(name) as i64;
                vlq::encode(name - previous.name, &mut mappings);
                previous.name = name;
            }
        }

        X::encode_extensions(mapping.data(), &mut sources, &mut self.fields)?;

        self.sources = sources.into_names();
        self.names = names.into_names();
        self.mappings = mappings;

        tracing::debug!(
            entries = mapping.len(),
            sources = self.sources.len(),
            names = self.names.len(),
            "Encoded source map"
        );
        Ok(())
    }

    /// Rebuild the data encoded in this document
    pub fn decoded_mappings<X: ExtensionSetCodec>(&self) -> DecodeResult<Data<X>> {
        let mut entries: Vec<Entry<X>> = Vec::new();
        let mut previous = Segment::default();

        let lines = split_with_offsets(&self.mappings, ';').enumerate();
        for (line_index, (line_offset, line)) in lines {
            if line.is_empty() {
                continue;
            }
            let generated_line =
                u32::try_from(line_index + 1).map_err(|_| DecodeError::ValueOutOfRange {
                    field: "generated line",
                    value: line_index as i64,
                })?;
            previous.generated_column = 0;

            for (segment_offset, segment) in split_with_offsets(line, ',') {
                let values = vlq::decode_segment(segment, line_offset + segment_offset)?;
                if !matches!(values.len(), 1 | 4 | 5) {
                    return Err(DecodeError::InvalidSegment {
                        line: line_index + 1,
                        fields: values.len(),
                    });
                }

                let column =
                    accumulate(&mut previous.generated_column, values[0], "generated column")?;
                if column < 0 {
                    return Err(DecodeError::ValueOutOfRange {
                        field: "generated column",
                        value: column,
                    });
                }
                let generated = Position::new(
                    generated_line,
                    one_based(column, "generated column")?,
                );

                if values.len() == 1 {
                    entries.push(Entry::new(generated));
                    continue;
                }

                accumulate(&mut previous.source, values[1], "source index")?;
                accumulate(&mut previous.original_line, values[2], "original line")?;
                accumulate(&mut previous.original_column, values[3], "original column")?;
                let original = FilePosition::new(
                    table_entry(&self.sources, previous.source).ok_or(
                        DecodeError::SourceIndexOutOfRange {
                            index: previous.source,
                            len: self.sources.len(),
                        },
                    )?,
                    Position::new(
                        one_based(previous.original_line, "original line")?,
                        one_based(previous.original_column, "original column")?,
                    ),
                );

                let name = match values.get(4) {
                    Some(delta) => {
                        accumulate(&mut previous.name, *delta, "name index")?;
                        let name = table_entry(&self.names, previous.name).ok_or(
                            DecodeError::NameIndexOutOfRange {
                                index: previous.name,
                                len: self.names.len(),
                            },
                        )?;
                        Some(name.to_string())
                    }
                    None => None,
                };

                entries.push(Entry::with_payloads(
                    generated,
                    original,
                    name,
                    X::Payloads::default(),
                ));
            }
        }

        let (payloads, extension_data) =
            X::decode_extensions(&self.fields, &self.sources, entries.len())?;
        for (entry, payload) in entries.iter_mut().zip(payloads) {
            entry.extensions = payload;
        }

        tracing::debug!(
            entries = entries.len(),
            sources = self.sources.len(),
            names = self.names.len(),
            "Decoded source map"
        );
        Ok(Data::new(entries, extension_data))
    }

    pub fn to_json(&self) -> EncodeResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json_pretty(&self) -> EncodeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, rejecting any version other than [`VERSION`]
    pub fn from_json(bytes: &[u8]) -> DecodeResult<Self> {
        let document: RevisionThree = serde_json::from_slice(bytes)?;
        if document.version != VERSION {
            return Err(DecodeError::UnsupportedVersion {
                found: document.version,
                expected: VERSION,
            });
        }
        Ok(document)
    }
}

/// Running values of the relative segment fields
#[derive(Debug, Default)]
struct Segment {
    generated_column: i64,
    source: i64,
    original_line: i64,
    original_column: i64,
    name: i64,
}

/// Split `text` on `separator`, yielding each part with its byte offset
pub(crate) fn split_with_offsets(
    text: &str,
    separator: char,
) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split(separator).map(move |part| {
        let start = offset;
        offset += part.len() + separator.len_utf8();
        (start, part)
    })
}

/// Add a decoded delta to a running value, rejecting overflow
pub(crate) fn accumulate(
    running: &mut i64,
    delta: i64,
    field: &'static str,
) -> DecodeResult<i64> {
    *running = running
        .checked_add(delta)
        .ok_or(DecodeError::ValueOutOfRange { field, value: delta })?;
    Ok(*running)
}

/// Convert a 0-based wire value into a 1-based position component
///
/// -1 maps to 0, which is how line or column 0 round-trips.
pub(crate) fn one_based(value: i64, field: &'static str) -> DecodeResult<u32> {
    value
        .checked_add(1)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(DecodeError::ValueOutOfRange { field, value })
}

pub(crate) fn table_entry(table: &[String], index: i64) -> Option<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|index| table.get(index))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::{Caller, CallerExtension, CallerIndex};
    use crate::entry::EntryList;

    type CallerMapping = Mapping<(CallerExtension,)>;

    fn build_mapping() -> CallerMapping {
        let entries: EntryList<(CallerExtension,)> = vec![
            Entry::new((1, 1)),
            Entry::mapped((1, 10), FilePosition::new("sourceOne", (1, 1)))
                .with_extension::<CallerExtension, _>(CallerIndex::new(0)),
            Entry::new((1, 15)),
            Entry::named((2, 10), FilePosition::new("sourceTwo", (1, 1)), "symbol")
                .with_extension::<CallerExtension, _>(CallerIndex::new(2)),
            Entry::new((2, 1)),
            Entry::new((2, 20)),
        ];
        let callers = vec![
            Caller::new(FilePosition::new("sourceTwo", (20, 1))),
            Caller::new(FilePosition::new("sourceTwo", (40, 1))),
            Caller::with_parent(FilePosition::new("sourceTwo", (40, 10)), 1),
        ];
        Mapping::new(Data::new(entries, (callers,)))
    }

    fn document(mappings: &str, sources: &[&str], names: &[&str]) -> RevisionThree {
        RevisionThree {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            names: names.iter().map(|s| s.to_string()).collect(),
            mappings: mappings.to_string(),
            ..RevisionThree::new()
        }
    }

    #[test]
    fn test_new_document() {
        let mut r3 = RevisionThree::new();
        assert_eq!(r3.version(), 3);
        assert_eq!(r3.file(), "");
        assert!(r3.source_root().is_none());

        r3.store_file("generated");
        r3.store_source_root("/src/");
        assert_eq!(r3.file(), "generated");
        assert_eq!(r3.source_root(), Some("/src/"));
    }

    #[test]
    fn test_encode_mappings_string() {
        let mut r3 = RevisionThree::new();
        r3.encode_mappings(&build_mapping()).unwrap();

        assert_eq!(r3.mappings(), "A,SAAA,K;A,SCAAA,U");
        assert_eq!(r3.sources(), ["sourceOne", "sourceTwo"]);
        assert_eq!(r3.names(), ["symbol"]);
    }

    #[test]
    fn test_encode_skips_empty_lines() {
        let mapping: Mapping = Mapping::new(Data::new(
            vec![
                Entry::new((2, 3)),
                Entry::mapped((4, 1), FilePosition::new("a", (2, 5))),
            ],
            (),
        ));
        let mut r3 = RevisionThree::new();
        r3.encode_mappings(&mapping).unwrap();
        assert_eq!(r3.mappings(), ";E;;AACI");

        let data = r3.decoded_mappings::<()>().unwrap();
        assert_eq!(data.entries, mapping.entries().clone());
    }

    #[test]
    fn test_encode_deduplicates_sources() {
        let mapping: Mapping = Mapping::new(Data::new(
            vec![
                Entry::mapped((1, 1), FilePosition::new("same", (1, 1))),
                Entry::mapped((1, 5), FilePosition::new("other", (3, 1))),
                Entry::mapped((2, 1), FilePosition::new("same", (7, 2))),
            ],
            (),
        ));
        let mut r3 = RevisionThree::new();
        r3.encode_mappings(&mapping).unwrap();
        assert_eq!(r3.sources(), ["same", "other"]);
        assert_eq!(r3.mappings(), "AAAA,ICEA;ADIC");
    }

    #[test]
    fn test_encode_rejects_invalid_generated() {
        let mapping: Mapping = Mapping::new(Data::new(vec![Entry::new((1, 0))], ()));
        let mut r3 = RevisionThree::new();
        assert!(matches!(
            r3.encode_mappings(&mapping),
            Err(EncodeError::InvalidGenerated { index: 0, .. })
        ));

        let mapping: Mapping = Mapping::new(Data::new(vec![Entry::new((0, 4))], ()));
        assert!(r3.encode_mappings(&mapping).is_err());
    }

    #[test]
    fn test_encode_drops_name_without_original() {
        let mapping: Mapping = Mapping::new(Data::new(
            vec![Entry::with_payloads(
                (1, 1),
                FilePosition::invalid(),
                Some("lost".into()),
                (),
            )],
            (),
        ));
        let mut r3 = RevisionThree::new();
        r3.encode_mappings(&mapping).unwrap();
        assert_eq!(r3.mappings(), "A");
        assert!(r3.names().is_empty());
    }

    #[test]
    fn test_json_document() {
        let mut r3 = RevisionThree::new();
        r3.store_file("generated");
        r3.encode_mappings(&build_mapping()).unwrap();

        insta::assert_snapshot!(r3.to_json_pretty().unwrap(), @r#"
        {
          "version": 3,
          "file": "generated",
          "sources": [
            "sourceOne",
            "sourceTwo"
          ],
          "names": [
            "symbol"
          ],
          "mappings": "A,SAAA,K;A,SCAAA,U",
          "x_callers": {
            "callers": "DCmBA,AAoBA,EAAS",
            "entries": "D,C,D,A,G,H",
            "version": 1
          }
        }
        "#);
    }

    #[test]
    fn test_from_json_roundtrip_document() {
        let mut r3 = RevisionThree::new();
        r3.store_file("generated");
        r3.store_source_root("src/");
        r3.encode_mappings(&build_mapping()).unwrap();

        let parsed = RevisionThree::from_json(&r3.to_json().unwrap()).unwrap();
        assert_eq!(parsed, r3);
        assert!(parsed.field("x_callers").is_some());
    }

    #[test]
    fn test_from_json_rejects_version() {
        let result = RevisionThree::from_json(br#"{"version":2,"sources":[],"mappings":""}"#);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedVersion { found: 2, expected: 3 })
        ));
    }

    #[test]
    fn test_from_json_rejects_syntax() {
        assert!(matches!(
            RevisionThree::from_json(b"{\"version\":3,"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            RevisionThree::from_json(br#"{"version":3}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_minimal() {
        let r3 = RevisionThree::from_json(br#"{"version":3,"sources":["a"],"mappings":"AAAA"}"#)
            .unwrap();
        assert_eq!(r3.file(), "");
        assert!(r3.names().is_empty());

        let data = r3.decoded_mappings::<(CallerExtension,)>().unwrap();
        assert_eq!(data.entries.len(), 1);
        assert_eq!(data.entries[0].original, FilePosition::new("a", (1, 1)));
        assert!(data.entries[0].extension::<CallerExtension, _>().is_none());
        assert!(data.extension::<CallerExtension, _>().is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_digit() {
        let r3 = document("AAAA,A*", &["a"], &[]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::InvalidBase64Digit { digit: '*', offset: 6 })
        ));
    }

    #[test]
    fn test_decode_rejects_segment_shape() {
        let r3 = document("AA", &["a"], &[]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::InvalidSegment { line: 1, fields: 2 })
        ));

        let r3 = document("A;A,,A", &[], &[]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::InvalidSegment { line: 2, fields: 0 })
        ));
    }

    #[test]
    fn test_decode_rejects_table_indices() {
        let r3 = document("ACAA", &["a"], &[]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::SourceIndexOutOfRange { index: 1, len: 1 })
        ));

        let r3 = document("AAAAC", &["a"], &["n"]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::NameIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_decode_rejects_negative_column() {
        let r3 = document("C,F", &[], &[]);
        assert!(matches!(
            r3.decoded_mappings::<()>(),
            Err(DecodeError::ValueOutOfRange {
                field: "generated column",
                value: -1
            })
        ));
    }

    #[test]
    fn test_split_with_offsets() {
        let parts: Vec<(usize, &str)> = split_with_offsets("ab;;c", ';').collect();
        assert_eq!(parts, vec![(0, "ab"), (3, ""), (4, "c")]);
    }
}
