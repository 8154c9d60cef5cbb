//! Caller extension: attribution chains for generated positions
//!
//! Every entry may point into the map's [`CallerList`]. Each [`Caller`]
//! records an original position (an expansion or inclusion site) and may
//! point to a parent caller, so the list forms a forest of chains.

use crate::data::Data;
use crate::entry::Entry;
use crate::extension::{Extension, ExtensionSet, Select};
use crate::mapping::Mapping;
use crate::position::FilePosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into a [`CallerList`], or none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerIndex(Option<usize>);

impl CallerIndex {
    pub const NONE: CallerIndex = CallerIndex(None);

    pub const fn new(index: usize) -> Self {
        CallerIndex(Some(index))
    }

    pub const fn get(self) -> Option<usize> {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0.is_none()
    }

    pub const fn is_some(self) -> bool {
        self.0.is_some()
    }
}

impl From<usize> for CallerIndex {
    fn from(index: usize) -> Self {
        CallerIndex::new(index)
    }
}

impl From<Option<usize>> for CallerIndex {
    fn from(index: Option<usize>) -> Self {
        CallerIndex(index)
    }
}

impl fmt::Display for CallerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => write!(f, "#{}", index),
            None => f.write_str("none"),
        }
    }
}

/// One attribution site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub original: FilePosition,
    pub parent: CallerIndex,
}

impl Caller {
    /// A caller without parent
    pub fn new(original: FilePosition) -> Self {
        Caller {
            original,
            parent: CallerIndex::NONE,
        }
    }

    pub fn with_parent(original: FilePosition, parent: impl Into<CallerIndex>) -> Self {
        Caller {
            original,
            parent: parent.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.original.is_valid()
    }
}

/// All callers of a source map; entries and parents refer to them by index
pub type CallerList = Vec<Caller>;

/// Original positions of a caller chain, nearest caller first
pub type CallerStack = Vec<FilePosition>;

/// Extension marker that attaches a [`CallerIndex`] to each entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerExtension;

impl Extension for CallerExtension {
    type Payload = CallerIndex;
    type MapData = CallerList;
}

/// Collect the caller chain of `entry`, nearest caller first
///
/// Returns an empty stack when the entry has no caller.
///
/// # Panics
///
/// Panics if a caller index is out of range or the parent links form a
/// cycle. Both mean the data is corrupt; decoded maps are validated against
/// this.
pub fn build_caller_stack<X, I>(data: &impl AsRef<Data<X>>, entry: &Entry<X>) -> CallerStack
where
    X: ExtensionSet + Select<CallerExtension, I>,
{
    let callers = data.as_ref().extension::<CallerExtension, I>();
    let mut stack = CallerStack::new();
    let mut next = *entry.extension::<CallerExtension, I>();

    while let Some(index) = next.get() {
        let caller = callers.get(index).unwrap_or_else(|| {
            panic!(
                "caller index {} out of range ({} callers)",
                index,
                callers.len()
            )
        });
        assert!(
            stack.len() < callers.len(),
            "caller chain through index {} is cyclic",
            index
        );
        stack.push(caller.original.clone());
        next = caller.parent;
    }
    stack
}

impl<X: ExtensionSet> Mapping<X> {
    /// The caller chain of `entry`, nearest caller first
    pub fn caller_stack<I>(&self, entry: &Entry<X>) -> CallerStack
    where
        X: Select<CallerExtension, I>,
    {
        build_caller_stack(self, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    type CallerMapping = Mapping<(CallerExtension,)>;
    type CallerEntry = Entry<(CallerExtension,)>;

    fn build_callers() -> CallerList {
        vec![
            Caller::new(FilePosition::new("sourceTwo", (20, 1))),
            Caller::new(FilePosition::new("sourceTwo", (40, 1))),
            Caller::with_parent(FilePosition::new("sourceTwo", (40, 10)), 1),
        ]
    }

    #[test]
    fn test_caller_index() {
        assert_eq!(CallerIndex::default(), CallerIndex::NONE);
        assert!(CallerIndex::default().is_none());
        assert_eq!(CallerIndex::new(99).get(), Some(99));
        assert_eq!(CallerIndex::from(None).get(), None);
        assert_eq!(CallerIndex::new(3).to_string(), "#3");
        assert_eq!(CallerIndex::NONE.to_string(), "none");
    }

    #[test]
    fn test_caller_value() {
        assert!(!Caller::default().is_valid());

        let caller = Caller::new(FilePosition::new("sourceOne", (3, 4)));
        assert!(caller.is_valid());
        assert_eq!(caller.original, FilePosition::new("sourceOne", (3, 4)));
        assert!(caller.parent.is_none());

        let child = Caller::with_parent(FilePosition::new("sourceOne", (3, 4)), 2);
        assert_eq!(child.parent.get(), Some(2));
    }

    #[test]
    fn test_entry_payload_defaults_to_none() {
        let entry = CallerEntry::new((3, 4));
        assert!(entry.extension::<CallerExtension, _>().is_none());

        let entry = CallerEntry::named((3, 4), FilePosition::new("hello", (6, 4)), "hello")
            .with_extension::<CallerExtension, _>(CallerIndex::new(32));
        assert_eq!(entry.extension::<CallerExtension, _>().get(), Some(32));
    }

    #[test]
    fn test_stack_without_caller_is_empty() {
        let mapping =
            CallerMapping::new(Data::new(vec![CallerEntry::new((1, 1))], (build_callers(),)));
        let entry = mapping.find_entry_by_generated(Position::new(1, 5)).unwrap();
        assert!(mapping.caller_stack(entry).is_empty());
    }

    #[test]
    fn test_stack_is_nearest_first() {
        let entry =
            CallerEntry::new((1, 1)).with_extension::<CallerExtension, _>(CallerIndex::new(2));
        let data = Data::new(vec![entry.clone()], (build_callers(),));

        let stack = build_caller_stack(&data, &entry);
        assert_eq!(
            stack,
            vec![
                FilePosition::new("sourceTwo", (40, 10)),
                FilePosition::new("sourceTwo", (40, 1)),
            ]
        );
    }

    #[test]
    fn test_stack_of_root_caller() {
        let entry =
            CallerEntry::new((1, 1)).with_extension::<CallerExtension, _>(CallerIndex::new(0));
        let data = Data::new(vec![entry.clone()], (build_callers(),));
        assert_eq!(
            build_caller_stack(&data, &entry),
            vec![FilePosition::new("sourceTwo", (20, 1))]
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_stack_out_of_range_panics() {
        let entry =
            CallerEntry::new((1, 1)).with_extension::<CallerExtension, _>(CallerIndex::new(7));
        let data = Data::new(vec![entry.clone()], (build_callers(),));
        build_caller_stack(&data, &entry);
    }

    #[test]
    #[should_panic(expected = "cyclic")]
    fn test_stack_cycle_panics() {
        let callers = vec![
            Caller::with_parent(FilePosition::new("a", (1, 1)), 1),
            Caller::with_parent(FilePosition::new("b", (1, 1)), 0),
        ];
        let entry =
            CallerEntry::new((1, 1)).with_extension::<CallerExtension, _>(CallerIndex::new(0));
        let data = Data::new(vec![entry.clone()], (callers,));
        build_caller_stack(&data, &entry);
    }
}
