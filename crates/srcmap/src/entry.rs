//! Mapping entries

use crate::extension::{Extension, ExtensionSet, Select};
use crate::position::{FilePosition, Position};
use std::fmt;

/// One record of a source map
///
/// Marks where a span of generated text starts and which original position
/// produced it. The span extends to the generated position of the next entry.
/// An invalid `original` means the generated text has no known source.
pub struct Entry<X: ExtensionSet = ()> {
    pub generated: Position,
    pub original: FilePosition,
    pub name: Option<String>,
    pub extensions: X::Payloads,
}

// Manual impls: derives would require the extension marker types themselves
// to be Clone/Debug/PartialEq.
impl<X: ExtensionSet> Clone for Entry<X> {
    fn clone(&self) -> Self {
        Entry {
            generated: self.generated,
            original: self.original.clone(),
            name: self.name.clone(),
            extensions: self.extensions,
        }
    }
}

impl<X: ExtensionSet> PartialEq for Entry<X> {
    fn eq(&self, other: &Self) -> bool {
        self.generated == other.generated
            && self.original == other.original
            && self.name == other.name
            && self.extensions == other.extensions
    }
}

impl<X: ExtensionSet> fmt::Debug for Entry<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("generated", &self.generated)
            .field("original", &self.original)
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// The ordered entries of a source map
pub type EntryList<X = ()> = Vec<Entry<X>>;

impl<X: ExtensionSet> Entry<X> {
    /// Entry for generated text without a known original
    pub fn new(generated: impl Into<Position>) -> Self {
        Entry {
            generated: generated.into(),
            original: FilePosition::invalid(),
            name: None,
            extensions: X::Payloads::default(),
        }
    }

    pub fn mapped(generated: impl Into<Position>, original: FilePosition) -> Self {
        Entry {
            original,
            ..Entry::new(generated)
        }
    }

    pub fn named(
        generated: impl Into<Position>,
        original: FilePosition,
        name: impl Into<String>,
    ) -> Self {
        Entry {
            name: Some(name.into()),
            ..Entry::mapped(generated, original)
        }
    }

    pub fn with_payloads(
        generated: impl Into<Position>,
        original: FilePosition,
        name: Option<String>,
        extensions: X::Payloads,
    ) -> Self {
        Entry {
            generated: generated.into(),
            original,
            name,
            extensions,
        }
    }

    /// Sets the payload of extension `E`
    pub fn with_extension<E, I>(mut self, payload: E::Payload) -> Self
    where
        E: Extension,
        X: Select<E, I>,
    {
        *X::payload_mut(&mut self.extensions) = payload;
        self
    }

    /// The payload of extension `E`
    pub fn extension<E, I>(&self) -> &E::Payload
    where
        E: Extension,
        X: Select<E, I>,
    {
        X::payload(&self.extensions)
    }

    pub fn extension_mut<E, I>(&mut self) -> &mut E::Payload
    where
        E: Extension,
        X: Select<E, I>,
    {
        X::payload_mut(&mut self.extensions)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether this entry maps to a known original position
    pub fn has_original(&self) -> bool {
        self.original.is_valid()
    }
}
