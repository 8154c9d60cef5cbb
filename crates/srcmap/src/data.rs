//! Source map data container

use crate::entry::EntryList;
use crate::extension::{Extension, ExtensionSet, Select};
use std::fmt;

/// All input data of a source map
///
/// Holds the entries, ordered by generated position, and one side-list per
/// extension. Keeping the entries sorted is the producer's job.
pub struct Data<X: ExtensionSet = ()> {
    pub entries: EntryList<X>,
    pub extension_data: X::MapData,
}

impl<X: ExtensionSet> Data<X> {
    pub fn new(entries: EntryList<X>, extension_data: X::MapData) -> Self {
        Data {
            entries,
            extension_data,
        }
    }

    /// The side-list of extension `E`
    pub fn extension<E, I>(&self) -> &E::MapData
    where
        E: Extension,
        X: Select<E, I>,
    {
        X::map_data(&self.extension_data)
    }

    pub fn extension_mut<E, I>(&mut self) -> &mut E::MapData
    where
        E: Extension,
        X: Select<E, I>,
    {
        X::map_data_mut(&mut self.extension_data)
    }
}

impl<X: ExtensionSet> Default for Data<X> {
    fn default() -> Self {
        Data::new(Vec::new(), X::MapData::default())
    }
}

impl<X: ExtensionSet> Clone for Data<X> {
    fn clone(&self) -> Self {
        Data::new(self.entries.clone(), self.extension_data.clone())
    }
}

impl<X: ExtensionSet> PartialEq for Data<X> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.extension_data == other.extension_data
    }
}

impl<X: ExtensionSet> fmt::Debug for Data<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("entries", &self.entries)
            .field("extension_data", &self.extension_data)
            .finish()
    }
}

impl<X: ExtensionSet> AsRef<Data<X>> for Data<X> {
    fn as_ref(&self) -> &Data<X> {
        self
    }
}
