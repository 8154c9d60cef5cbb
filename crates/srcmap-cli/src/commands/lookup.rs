//! Lookup command implementation.
//!
//! Resolves one generated position and prints the original position, the
//! symbol name and the caller chain of the entry covering it.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use srcmap::Position;

use super::{CallerMapping, load_mapping};

/// Arguments for the lookup command
#[derive(Debug)]
pub struct LookupArgs {
    /// Source map file
    pub map: PathBuf,
    /// Generated line
    pub line: u32,
    /// Generated column
    pub column: u32,
}

/// Execute the lookup command
pub fn execute(args: LookupArgs) -> Result<()> {
    let (_, mapping) = load_mapping(&args.map)?;
    let position = Position::new(args.line, args.column);
    if !position.is_valid() {
        info!(%position, "Column 0 is not a valid generated position");
    }
    print!("{}", describe(&mapping, position));
    Ok(())
}

/// Render the lookup result for `position`
pub fn describe(mapping: &CallerMapping, position: Position) -> String {
    let mut out = String::new();
    let Some(entry) = mapping.find_entry_by_generated(position) else {
        let _ = writeln!(out, "{}: before the first mapped position", position);
        return out;
    };

    if entry.has_original() {
        let _ = writeln!(out, "{} -> {}", position, entry.original);
    } else {
        let _ = writeln!(out, "{} -> no original source", position);
    }
    if let Some(name) = entry.name() {
        let _ = writeln!(out, "  name: {}", name);
    }
    for caller in mapping.caller_stack(entry) {
        let _ = writeln!(out, "  called from {}", caller);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_sample_map;

    #[test]
    fn test_describe_with_callers() {
        let file = write_sample_map();
        let (_, mapping) = load_mapping(file.path()).unwrap();

        assert_eq!(
            describe(&mapping, Position::new(1, 12)),
            "1:12 -> main.src:4:2\n  name: expand\n  called from macros.src:7:3\n  called from main.src:2:1\n"
        );
    }

    #[test]
    fn test_describe_unmapped() {
        let file = write_sample_map();
        let (_, mapping) = load_mapping(file.path()).unwrap();

        assert_eq!(
            describe(&mapping, Position::new(1, 3)),
            "1:3 -> no original source\n"
        );
        assert_eq!(
            describe(&mapping, Position::new(0, 3)),
            "0:3: before the first mapped position\n"
        );
    }
}
