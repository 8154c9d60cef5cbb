//! Inspect command implementation.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use srcmap::{CallerExtension, RevisionThree};

use super::{CallerMapping, load_mapping};

/// Execute the inspect command
pub fn execute(map: &Path) -> Result<()> {
    let (document, mapping) = load_mapping(map)?;
    print!("{}", summarize(&document, &mapping));
    Ok(())
}

/// Render a summary of the document and its decoded mapping
pub fn summarize(document: &RevisionThree, mapping: &CallerMapping) -> String {
    let mapped = mapping
        .entries()
        .iter()
        .filter(|entry| entry.has_original())
        .count();

    let mut out = String::new();
    let _ = writeln!(out, "file:    {}", document.file());
    let _ = writeln!(out, "version: {}", document.version());
    if let Some(root) = document.source_root() {
        let _ = writeln!(out, "root:    {}", root);
    }
    let _ = writeln!(out, "entries: {} ({} mapped)", mapping.len(), mapped);
    let _ = writeln!(out, "sources: {}", document.sources().join(", "));
    let _ = writeln!(out, "names:   {}", document.names().join(", "));
    let _ = writeln!(
        out,
        "callers: {}",
        mapping.extension::<CallerExtension, _>().len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_sample_map;

    #[test]
    fn test_summarize() {
        let file = write_sample_map();
        let (document, mapping) = load_mapping(file.path()).unwrap();

        assert_eq!(
            summarize(&document, &mapping),
            "file:    main.out\n\
             version: 3\n\
             entries: 2 (1 mapped)\n\
             sources: main.src, macros.src\n\
             names:   expand\n\
             callers: 2\n"
        );
    }
}
