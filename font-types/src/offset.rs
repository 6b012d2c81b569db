//! Offsets to tables, relative to some base.

use std::marker::PhantomData;

use crate::raw::Scalar;
use crate::uint24::Uint24;

/// A type that can report whether it is a null offset.
pub trait Offset: Copy {
    /// The offset as a byte count from its base, or `None` if it is null (0).
    fn non_null(self) -> Option<usize>;
}

macro_rules! impl_offset {
    ($name:ident, $bits:literal, $rawty:ty) => {
        #[doc = concat!("A ", stringify!($bits), "-bit offset to a table.")]
        ///
        /// The type parameter `T` records what the offset points at; it is
        /// phantom and contributes nothing to the wire representation, but
        /// lets fields declare `Offset16<Script>` instead of a bare `u16`
        /// whose target is only documented in a comment. Specific fields may
        /// or may not permit NULL values; callers are expected to handle the
        /// `None` case returned by [`Offset::non_null`].
        pub struct $name<T>($rawty, PhantomData<T>);

        impl<T> $name<T> {
            pub fn new(raw: $rawty) -> Self {
                Self(raw, PhantomData)
            }

            pub fn to_usize(self) -> usize {
                let raw: u32 = self.0.into();
                raw as usize
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }
        impl<T> Copy for $name<T> {}
        impl<T> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl<T> Eq for $name<T> {}
        impl<T> std::fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }

        impl<T> Scalar for $name<T> {
            type Raw = <$rawty as Scalar>::Raw;

            fn from_raw(raw: Self::Raw) -> Self {
                $name::new(<$rawty>::from_raw(raw))
            }

            fn to_raw(self) -> Self::Raw {
                self.0.to_raw()
            }
        }

        impl<T> Offset for $name<T> {
            fn non_null(self) -> Option<usize> {
                let val = self.to_usize();
                (val != 0).then_some(val)
            }
        }
    };
}

impl_offset!(Offset16, 16, u16);
impl_offset!(Offset24, 24, Uint24);
impl_offset!(Offset32, 32, u32);
