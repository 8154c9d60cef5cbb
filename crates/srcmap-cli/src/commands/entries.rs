//! Entries command implementation.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;

use srcmap::CallerExtension;

use super::{CallerMapping, load_mapping};

/// Execute the entries command
pub fn execute(map: &Path) -> Result<()> {
    let (_, mapping) = load_mapping(map)?;
    print!("{}", list(&mapping));
    Ok(())
}

/// One line per entry: generated position, original, name and caller index
pub fn list(mapping: &CallerMapping) -> String {
    let mut out = String::new();
    for entry in mapping.entries() {
        let _ = write!(out, "{}", entry.generated);
        if entry.has_original() {
            let _ = write!(out, "\t{}", entry.original);
        } else {
            let _ = write!(out, "\t-");
        }
        let _ = write!(out, "\t{}", entry.name().unwrap_or("-"));
        let _ = writeln!(out, "\t{}", entry.extension::<CallerExtension, _>());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_sample_map;

    #[test]
    fn test_list() {
        let file = write_sample_map();
        let (_, mapping) = load_mapping(file.path()).unwrap();

        assert_eq!(
            list(&mapping),
            "1:1\t-\t-\tnone\n1:10\tmain.src:4:2\texpand\t#1\n"
        );
    }
}
