//! Lookup of entries by generated position

use crate::data::Data;
use crate::entry::{Entry, EntryList};
use crate::extension::{Extension, ExtensionSet, Select};
use crate::position::Position;
use indexmap::IndexSet;
use std::fmt;

/// Read-only query interface over source map [`Data`]
pub struct Mapping<X: ExtensionSet = ()> {
    data: Data<X>,
}

impl<X: ExtensionSet> Mapping<X> {
    /// Wraps the data, ordering the entries by generated position
    ///
    /// The sort is stable, so entries sharing a generated position keep the
    /// order the producer gave them.
    pub fn new(mut data: Data<X>) -> Self {
        if !data.entries.is_sorted_by_key(|entry| entry.generated) {
            tracing::debug!(
                entries = data.entries.len(),
                "Sorting source map entries by generated position"
            );
            data.entries.sort_by_key(|entry| entry.generated);
        }
        Mapping { data }
    }

    pub fn data(&self) -> &Data<X> {
        &self.data
    }

    pub fn into_data(self) -> Data<X> {
        self.data
    }

    pub fn entries(&self) -> &EntryList<X> {
        &self.data.entries
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Find the entry that covers a generated position
    ///
    /// Returns the entry with the greatest generated position that is not
    /// after `position`. Positions past the last entry resolve to the last
    /// entry; positions before the first entry resolve to `None`. Among
    /// entries sharing a generated position the last one wins.
    ///
    /// The returned entry may have an invalid original position, meaning the
    /// generated text at `position` has no known source.
    ///
    /// Runs in O(log n) time.
    pub fn find_entry_by_generated(&self, position: Position) -> Option<&Entry<X>> {
        let after = self
            .data
            .entries
            .partition_point(|entry| entry.generated <= position);
        after.checked_sub(1).map(|index| &self.data.entries[index])
    }

    /// Distinct original file names, in order of first appearance
    pub fn original_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self
            .data
            .entries
            .iter()
            .filter(|entry| entry.has_original())
            .map(|entry| entry.original.name.as_str())
            .collect();
        names.into_iter().collect()
    }

    /// Distinct symbol names, in order of first appearance
    pub fn symbol_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = self.data.entries.iter().filter_map(Entry::name).collect();
        names.into_iter().collect()
    }

    /// The side-list of extension `E`
    pub fn extension<E, I>(&self) -> &E::MapData
    where
        E: Extension,
        X: Select<E, I>,
    {
        self.data.extension::<E, I>()
    }
}

impl<X: ExtensionSet> From<Data<X>> for Mapping<X> {
    fn from(data: Data<X>) -> Self {
        Mapping::new(data)
    }
}

impl<X: ExtensionSet> AsRef<Data<X>> for Mapping<X> {
    fn as_ref(&self) -> &Data<X> {
        &self.data
    }
}

impl<X: ExtensionSet> Clone for Mapping<X> {
    fn clone(&self) -> Self {
        Mapping {
            data: self.data.clone(),
        }
    }
}

impl<X: ExtensionSet> fmt::Debug for Mapping<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping").field("data", &self.data).finish()
    }
}
