//! Stable integer references into a [`super::Document`]'s typed node tables.
//!
//! Each table gets its own newtype so that a reference into the wrong table
//! is a type error rather than an off-by-one bug. This is the same trick the
//! teacher crate uses for schema coordinates (`schema::referencer`'s
//! `*DefinitionPosition` family), applied here to arena indices instead.

use std::fmt;

macro_rules! table_ref {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index.try_into().expect("arena table exceeded u32::MAX entries"))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

table_ref!(OperationDefinitionRef);
table_ref!(FragmentDefinitionRef);
table_ref!(SelectionSetRef);
table_ref!(FieldRef);
table_ref!(ArgumentRef);
table_ref!(VariableDefinitionRef);
table_ref!(TypeRef);
table_ref!(ValueRef);
table_ref!(InlineFragmentRef);
table_ref!(FragmentSpreadRef);

/// A (start, end) byte range into a [`super::Document`]'s owned input buffer.
///
/// Two documents never share an input buffer, so a `ByteSliceReference`
/// obtained from one document is meaningless against another; copying a name
/// across documents must go through [`super::Document::append_input_bytes`]
/// or the [`super::importer`].
///
/// Structural (`start`, `end`) equality is used for `Hash`/`IndexMap` keys
/// within a single document's lifetime; comparing the *bytes* a reference
/// points at (the spec's "equality is byte-wise on the referenced slice")
/// is [`super::Document::slice_eq`], which requires the owning document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSliceReference {
    start: u32,
    end: u32,
}

impl ByteSliceReference {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.try_into().expect("input buffer exceeded u32::MAX bytes"),
            end: end.try_into().expect("input buffer exceeded u32::MAX bytes"),
        }
    }

    pub(crate) fn range(self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl Default for ByteSliceReference {
    fn default() -> Self {
        ByteSliceReference::new(0, 0)
    }
}
