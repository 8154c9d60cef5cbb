//! Source maps with pluggable extensions
//!
//! This crate records where the text of a generated artifact came from: each
//! [`Entry`] maps a generated [`Position`] to an original [`FilePosition`]
//! (possibly unknown) and an optional symbol name. Extensions attach extra
//! data to every entry; the built-in [`CallerExtension`] records attribution
//! chains such as "expanded here, from a macro invoked there".
//!
//! # Overview
//!
//! The core types are:
//! - [`Data`]: the entries plus one side-list per extension
//! - [`Mapping`]: lookup of the entry covering a generated position
//! - [`build_caller_stack`]: the caller chain of an entry, nearest first
//! - [`RevisionThree`]: the standard JSON source map document
//!
//! # Example
//!
//! ```rust
//! use srcmap::*;
//!
//! type CallerMapping = Mapping<(CallerExtension,)>;
//!
//! let callers = vec![Caller::new(FilePosition::new("macros.src", (12, 1)))];
//! let entries: EntryList<(CallerExtension,)> = vec![
//!     Entry::new((1, 1)),
//!     Entry::mapped((1, 8), FilePosition::new("main.src", (3, 5)))
//!         .with_extension::<CallerExtension, _>(CallerIndex::new(0)),
//! ];
//! let mapping = CallerMapping::new(Data::new(entries, (callers,)));
//!
//! let entry = mapping.find_entry_by_generated(Position::new(1, 20)).unwrap();
//! assert_eq!(entry.original, FilePosition::new("main.src", (3, 5)));
//! assert_eq!(
//!     mapping.caller_stack(entry),
//!     vec![FilePosition::new("macros.src", (12, 1))]
//! );
//!
//! // Write and read back the interchange document
//! let mut document = RevisionThree::new();
//! document.store_file("main.out");
//! document.encode_mappings(&mapping).unwrap();
//! let json = document.to_json().unwrap();
//!
//! let decoded = RevisionThree::from_json(&json).unwrap();
//! let restored = CallerMapping::new(decoded.decoded_mappings().unwrap());
//! assert_eq!(restored.entries(), mapping.entries());
//! ```

pub mod caller;
pub mod data;
pub mod entry;
pub mod error;
pub mod extension;
pub mod mapping;
pub mod position;
pub mod revision_three;
pub mod vlq;

// Re-export main types
pub use caller::{
    Caller, CallerExtension, CallerIndex, CallerList, CallerStack, build_caller_stack,
};
pub use data::Data;
pub use entry::{Entry, EntryList};
pub use error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use extension::{Extension, ExtensionSet, Select};
pub use mapping::Mapping;
pub use position::{FilePosition, Position};
pub use revision_three::{ExtensionCodec, ExtensionSetCodec, NameTable, RevisionThree};
