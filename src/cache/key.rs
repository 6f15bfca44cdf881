//! Cache Key Module
//!
//! Normalizes caller-supplied keys into the canonical string form stored in the table.

use std::borrow::Cow;

// == Cache Key ==
/// A value usable as a cache key.
///
/// Every key is reduced to its string form before lookup or mutation, so two
/// keys that stringify identically always address the same slot: `123_u32`
/// and `"123"` are one entry.
pub trait CacheKey {
    /// Returns the canonical string form of this key.
    fn normalize(&self) -> Cow<'_, str>;
}

impl CacheKey for str {
    fn normalize(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl CacheKey for String {
    fn normalize(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl CacheKey for Cow<'_, str> {
    fn normalize(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_ref())
    }
}

impl<K: CacheKey + ?Sized> CacheKey for &K {
    fn normalize(&self) -> Cow<'_, str> {
        (**self).normalize()
    }
}

macro_rules! impl_display_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CacheKey for $ty {
                fn normalize(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

impl_display_key!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool);
