//! Command implementations for the srcmap CLI
//!
//! Each command loads a Revision-Three document with the caller extension
//! and prints what it finds to stdout.

pub mod entries;
pub mod inspect;
pub mod lookup;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use srcmap::{CallerExtension, Mapping, RevisionThree};

/// The mapping type every command works with
pub type CallerMapping = Mapping<(CallerExtension,)>;

/// Read and decode a source map file
pub fn load_mapping(path: &Path) -> Result<(RevisionThree, CallerMapping)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = RevisionThree::from_json(&bytes)
        .with_context(|| format!("Failed to parse source map {}", path.display()))?;
    let data = document
        .decoded_mappings()
        .with_context(|| format!("Failed to decode mappings of {}", path.display()))?;

    let mapping = CallerMapping::new(data);
    debug!(path = %path.display(), entries = mapping.len(), "Loaded source map");
    Ok((document, mapping))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_mapping() {
        let file = test_support::write_sample_map();
        let (document, mapping) = load_mapping(file.path()).unwrap();
        assert_eq!(document.file(), "main.out");
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.extension::<CallerExtension, _>().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_mapping(Path::new("/nonexistent/out.map")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
