//! Pluggable per-entry extensions
//!
//! An [`Extension`] contributes one payload value to every entry and one
//! side-list to the map data. A concrete map picks its extensions as a tuple
//! type, e.g. `Mapping<(CallerExtension,)>`; `()` means no extensions.
//!
//! Payloads and side-lists are looked up by extension type through
//! [`Select`]. The second type parameter of `Select` is an index marker that
//! the compiler infers, so call sites read `entry.extension::<CallerExtension, _>()`.
//! Asking for an extension that is not part of the tuple does not compile.

use std::fmt::Debug;

/// A type-identified attachment to entries and map data
pub trait Extension: 'static {
    /// Value stored in every entry; `Default` is the "absent" sentinel
    type Payload: Copy + Default + Debug + PartialEq;
    /// Side-list stored once in the map data
    type MapData: Clone + Default + Debug + PartialEq;
}

/// A fixed set of extensions, implemented for tuples of [`Extension`]s
pub trait ExtensionSet: 'static {
    type Payloads: Copy + Default + Debug + PartialEq;
    type MapData: Clone + Default + Debug + PartialEq;
}

/// Type-directed access to one extension `E` of an extension set
///
/// `I` is one of the `Index*` markers and only exists to keep the impls for
/// different tuple positions apart.
pub trait Select<E: Extension, I>: ExtensionSet {
    fn payload(payloads: &Self::Payloads) -> &E::Payload;
    fn payload_mut(payloads: &mut Self::Payloads) -> &mut E::Payload;
    fn map_data(data: &Self::MapData) -> &E::MapData;
    fn map_data_mut(data: &mut Self::MapData) -> &mut E::MapData;
}

pub enum Index0 {}
pub enum Index1 {}
pub enum Index2 {}
pub enum Index3 {}

impl ExtensionSet for () {
    type Payloads = ();
    type MapData = ();
}

macro_rules! impl_extension_set {
    ($($T:ident),+) => {
        impl<$($T: Extension),+> ExtensionSet for ($($T,)+) {
            type Payloads = ($($T::Payload,)+);
            type MapData = ($($T::MapData,)+);
        }
    };
}

impl_extension_set!(A);
impl_extension_set!(A, B);
impl_extension_set!(A, B, C);
impl_extension_set!(A, B, C, D);

macro_rules! impl_select {
    ([$($T:ident),+], $E:ident, $idx:tt, $Index:ty) => {
        impl<$($T: Extension),+> Select<$E, $Index> for ($($T,)+) {
            fn payload(payloads: &Self::Payloads) -> &$E::Payload {
                &payloads.$idx
            }

            fn payload_mut(payloads: &mut Self::Payloads) -> &mut $E::Payload {
                &mut payloads.$idx
            }

            fn map_data(data: &Self::MapData) -> &$E::MapData {
                &data.$idx
            }

            fn map_data_mut(data: &mut Self::MapData) -> &mut $E::MapData {
                &mut data.$idx
            }
        }
    };
}

impl_select!([A], A, 0, Index0);

impl_select!([A, B], A, 0, Index0);
impl_select!([A, B], B, 1, Index1);

impl_select!([A, B, C], A, 0, Index0);
impl_select!([A, B, C], B, 1, Index1);
impl_select!([A, B, C], C, 2, Index2);

impl_select!([A, B, C, D], A, 0, Index0);
impl_select!([A, B, C, D], B, 1, Index1);
impl_select!([A, B, C, D], C, 2, Index2);
impl_select!([A, B, C, D], D, 3, Index3);
