//! `x_callers` field of the caller extension
//!
//! ```json
//! "x_callers": { "version": 1, "callers": "DCmBA,AAoBA,EAAS", "entries": "D,C,D,A,G,H" }
//! ```
//!
//! `callers` has one segment per caller: the parent index (-1 for none),
//! followed by source index, original line and original column when the
//! caller has a valid original position. `entries` has one single-value
//! segment per entry holding its caller index (-1 for none). All values are
//! deltas against the previous segment of the same string.

use super::extension::{ExtensionCodec, NameTable};
use super::{accumulate, one_based, split_with_offsets, table_entry};
use crate::caller::{Caller, CallerExtension, CallerIndex, CallerList};
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::position::{FilePosition, Position};
use crate::vlq;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CALLERS_FIELD: &str = "x_callers";
const FIELD_VERSION: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CallerField {
    version: u64,
    callers: String,
    entries: String,
}

impl ExtensionCodec for CallerExtension {
    const FIELD: &'static str = CALLERS_FIELD;

    fn encode(
        payloads: &[CallerIndex],
        callers: &CallerList,
        sources: &mut NameTable,
    ) -> EncodeResult<Option<Value>> {
        if callers.is_empty() && payloads.iter().all(|index| index.is_none()) {
            return Ok(None);
        }

        let mut encoded_callers = String::new();
        let (mut parent, mut source, mut line, mut column) = (0, 0, 0, 0);
        for (position, caller) in callers.iter().enumerate() {
            if position > 0 {
                encoded_callers.push(',');
            }
            let next_parent = wire_index(caller.parent);
            vlq::encode(next_parent - parent, &mut encoded_callers);
            parent = next_parent;

            if !caller.is_valid() {
                continue;
            }
            let next_source = sources.index_of(&caller.original.name) as i64;
            let next_line = i64::from(caller.original.line()) - 1;
            let next_column = i64::from(caller.original.column()) - 1;
            vlq::encode_segment(
                &[next_source - source, next_line - line, next_column - column],
                &mut encoded_callers,
            );
            (source, line, column) = (next_source, next_line, next_column);
        }

        let mut encoded_entries = String::new();
        let mut previous = 0;
        for (position, index) in payloads.iter().enumerate() {
            if position > 0 {
                encoded_entries.push(',');
            }
            let next = wire_index(*index);
            vlq::encode(next - previous, &mut encoded_entries);
            previous = next;
        }

        let value = serde_json::to_value(CallerField {
            version: FIELD_VERSION,
            callers: encoded_callers,
            entries: encoded_entries,
        })?;
        Ok(Some(value))
    }

    fn decode(
        value: &Value,
        sources: &[String],
        entry_count: usize,
    ) -> DecodeResult<(Vec<CallerIndex>, CallerList)> {
        let field = CallerField::deserialize(value).map_err(|err| malformed(err.to_string()))?;
        if field.version != FIELD_VERSION {
            return Err(DecodeError::UnsupportedExtensionVersion {
                field: CALLERS_FIELD,
                found: field.version,
                expected: FIELD_VERSION,
            });
        }

        let caller_count = segments(&field.callers).count();
        let mut callers = CallerList::with_capacity(caller_count);
        let (mut parent, mut source, mut line, mut column) = (0, 0, 0, 0);
        for (offset, segment) in segments(&field.callers) {
            let values = vlq::decode_segment(segment, offset)?;
            match values.len() {
                1 | 4 => {}
                fields => {
                    return Err(malformed(format!(
                        "caller segment at byte {} has {} fields (expected 1 or 4)",
                        offset, fields
                    )));
                }
            }
            accumulate(&mut parent, values[0], "caller parent")?;
            let parent_index = caller_index(parent, caller_count)?;

            let original = if values.len() == 4 {
                accumulate(&mut source, values[1], "caller source index")?;
                accumulate(&mut line, values[2], "caller line")?;
                accumulate(&mut column, values[3], "caller column")?;
                let name = table_entry(sources, source).ok_or(
                    DecodeError::SourceIndexOutOfRange {
                        index: source,
                        len: sources.len(),
                    },
                )?;
                FilePosition::new(
                    name,
                    Position::new(
                        one_based(line, "caller line")?,
                        one_based(column, "caller column")?,
                    ),
                )
            } else {
                FilePosition::invalid()
            };
            callers.push(Caller::with_parent(original, parent_index));
        }
        check_acyclic(&callers)?;

        let mut payloads = Vec::with_capacity(entry_count);
        let mut index = 0;
        for (offset, segment) in segments(&field.entries) {
            let values = vlq::decode_segment(segment, offset)?;
            if values.len() != 1 {
                return Err(malformed(format!(
                    "entry segment at byte {} has {} fields (expected 1)",
                    offset,
                    values.len()
                )));
            }
            accumulate(&mut index, values[0], "entry caller index")?;
            payloads.push(caller_index(index, callers.len())?);
        }
        if payloads.len() != entry_count {
            return Err(DecodeError::EntryCountMismatch {
                field: CALLERS_FIELD,
                found: payloads.len(),
                expected: entry_count,
            });
        }

        Ok((payloads, callers))
    }
}

fn wire_index(index: CallerIndex) -> i64 {
    index.get().map_or(-1, |index| index as i64)
}

fn caller_index(value: i64, len: usize) -> DecodeResult<CallerIndex> {
    if value == -1 {
        return Ok(CallerIndex::NONE);
    }
    usize::try_from(value)
        .ok()
        .filter(|&index| index < len)
        .map(CallerIndex::new)
        .ok_or(DecodeError::CallerIndexOutOfRange { index: value, len })
}

/// Segments of a comma-separated string; an empty string has none
fn segments(text: &str) -> impl Iterator<Item = (usize, &str)> {
    split_with_offsets(text, ',').filter(move |_| !text.is_empty())
}

fn malformed(message: String) -> DecodeError {
    DecodeError::MalformedExtension {
        field: CALLERS_FIELD,
        message,
    }
}

/// Reject parent links that loop back on themselves
fn check_acyclic(callers: &[Caller]) -> DecodeResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; callers.len()];
    for start in 0..callers.len() {
        let mut path = Vec::new();
        let mut next = Some(start);
        while let Some(index) = next {
            match marks[index] {
                Mark::Done => break,
                Mark::InProgress => return Err(DecodeError::CallerCycle { index }),
                Mark::Unvisited => {
                    marks[index] = Mark::InProgress;
                    path.push(index);
                    next = callers[index].parent.get();
                }
            }
        }
        for index in path {
            marks[index] = Mark::Done;
        }
    }
    Ok(())
}
