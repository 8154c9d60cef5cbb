//! Encoding of extension data alongside the standard fields

use crate::data::Data;
use crate::error::{DecodeResult, EncodeResult};
use crate::extension::{Extension, ExtensionSet};
use indexmap::IndexSet;
use serde_json::{Map, Value};

/// Deduplicated names, indexed in order of first appearance
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    names: IndexSet<String>,
}

impl NameTable {
    /// Index of `name`, inserting it if it is new
    pub fn index_of(&mut self, name: &str) -> usize {
        match self.names.get_index_of(name) {
            Some(index) => index,
            None => self.names.insert_full(name.to_string()).0,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names.into_iter().collect()
    }
}

/// Document representation of one extension
///
/// The extension owns one top-level document field named [`FIELD`](Self::FIELD).
/// File names it references go through the shared sources table, after all
/// names used by the entries themselves.
pub trait ExtensionCodec: Extension {
    const FIELD: &'static str;

    /// Encode the per-entry payloads (in entry order) and the side-list
    ///
    /// Returns `None` when there is nothing to store.
    fn encode(
        payloads: &[Self::Payload],
        data: &Self::MapData,
        sources: &mut NameTable,
    ) -> EncodeResult<Option<Value>>;

    /// Decode a field written by [`encode`](Self::encode)
    ///
    /// Must return exactly `entry_count` payloads.
    fn decode(
        value: &Value,
        sources: &[String],
        entry_count: usize,
    ) -> DecodeResult<(Vec<Self::Payload>, Self::MapData)>;
}

/// Document representation of a whole extension set
pub trait ExtensionSetCodec: ExtensionSet + Sized {
    fn encode_extensions(
        data: &Data<Self>,
        sources: &mut NameTable,
        fields: &mut Map<String, Value>,
    ) -> EncodeResult<()>;

    /// A missing field decodes to absent payloads and an empty side-list
    fn decode_extensions(
        fields: &Map<String, Value>,
        sources: &[String],
        entry_count: usize,
    ) -> DecodeResult<(Vec<Self::Payloads>, Self::MapData)>;
}

impl ExtensionSetCodec for () {
    fn encode_extensions(
        _: &Data<Self>,
        _: &mut NameTable,
        _: &mut Map<String, Value>,
    ) -> EncodeResult<()> {
        Ok(())
    }

    fn decode_extensions(
        _: &Map<String, Value>,
        _: &[String],
        entry_count: usize,
    ) -> DecodeResult<(Vec<()>, ())> {
        Ok((vec![(); entry_count], ()))
    }
}

macro_rules! impl_extension_set_codec {
    ($(($T:ident, $idx:tt)),+) => {
        impl<$($T: ExtensionCodec),+> ExtensionSetCodec for ($($T,)+) {
            fn encode_extensions(
                data: &Data<Self>,
                sources: &mut NameTable,
                fields: &mut Map<String, Value>,
            ) -> EncodeResult<()> {
                $(
                    let payloads: Vec<$T::Payload> =
                        data.entries.iter().map(|entry| entry.extensions.$idx).collect();
                    match $T::encode(&payloads, &data.extension_data.$idx, sources)? {
                        Some(value) => {
                            fields.insert($T::FIELD.to_string(), value);
                        }
                        None => {
                            fields.remove($T::FIELD);
                        }
                    }
                )+
                Ok(())
            }

            fn decode_extensions(
                fields: &Map<String, Value>,
                sources: &[String],
                entry_count: usize,
            ) -> DecodeResult<(Vec<Self::Payloads>, Self::MapData)> {
                let mut payloads = vec![Self::Payloads::default(); entry_count];
                let mut data = Self::MapData::default();
                $(
                    if let Some(value) = fields.get($T::FIELD) {
                        let (decoded, side_list) = $T::decode(value, sources, entry_count)?;
                        for (payload, decoded) in payloads.iter_mut().zip(decoded) {
                            payload.$idx = decoded;
                        }
                        data.$idx = side_list;
                    }
                )+
                Ok((payloads, data))
            }
        }
    };
}

impl_extension_set_codec!((A, 0));
impl_extension_set_codec!((A, 0), (B, 1));
impl_extension_set_codec!((A, 0), (B, 1), (C, 2));
impl_extension_set_codec!((A, 0), (B, 1), (C, 2), (D, 3));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::error::EncodeError;
    use crate::mapping::Mapping;
    use crate::revision_three::RevisionThree;

    /// Extension whose encoder always fails
    struct Unencodable;

    impl Extension for Unencodable {
        type Payload = ();
        type MapData = ();
    }

    impl ExtensionCodec for Unencodable {
        const FIELD: &'static str = "x_unencodable";

        fn encode(_: &[()], _: &(), _: &mut NameTable) -> EncodeResult<Option<Value>> {
            let err = serde_json::from_str::<Value>("{").unwrap_err();
            Err(EncodeError::Json(err))
        }

        fn decode(_: &Value, _: &[String], entry_count: usize) -> DecodeResult<(Vec<()>, ())> {
            Ok((vec![(); entry_count], ()))
        }
    }

    #[test]
    fn test_name_table_deduplicates() {
        let mut table = NameTable::default();
        assert!(table.is_empty());
        assert_eq!(table.index_of("one"), 0);
        assert_eq!(table.index_of("two"), 1);
        assert_eq!(table.index_of("one"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.into_names(), vec!["one", "two"]);
    }

    #[test]
    fn test_unit_set_decodes_absent_payloads() {
        let (payloads, ()) = <() as ExtensionSetCodec>::decode_extensions(&Map::new(), &[], 3)
            .unwrap();
        assert_eq!(payloads.len(), 3);
    }

    #[test]
    fn test_encode_failure_propagates() {
        let mapping: Mapping<(Unencodable,)> =
            Mapping::new(Data::new(vec![Entry::new((1, 1))], ((),)));
        let mut r3 = RevisionThree::new();

        assert!(matches!(
            r3.encode_mappings(&mapping),
            Err(EncodeError::Json(_))
        ));
        assert!(r3.field(Unencodable::FIELD).is_none());
        assert!(r3.mappings().is_empty());
    }
}
