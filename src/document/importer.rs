//! Copies a type reference from one document into another.
//!
//! Grounded on `p.v.Importer.ImportType(...)` in
//! `examples/original_source/pkg/engine/datasource/graphqldatasource/graphql_datasource.go`'s
//! `applyFieldArgument`: when a variable's declared type needs to appear on
//! the upstream operation, its `Named | List | NonNull` shape is walked and
//! rebuilt against the destination document's own input buffer and type
//! table, since the two documents never share either.

use super::{Document, TypeData, TypeRef};

/// Recursively copies `src_type` (which lives in `src_doc`) into `dst_doc`,
/// preserving `List`/`NonNull` wrapping, and returns the new reference.
///
/// Pure: the only side effect is appending to `dst_doc`'s input buffer and
/// type table. See SPEC_FULL.md §4.2 and the "type import roundtrip"
/// property in §8.
pub fn import_type(src_type: TypeRef, src_doc: &Document, dst_doc: &mut Document) -> TypeRef {
    match *src_doc.ty(src_type) {
        TypeData::Named(name) => {
            let name_bytes = src_doc.resolve_bytes(name);
            let imported_name = dst_doc.append_input_bytes(name_bytes);
            dst_doc.add_type(TypeData::Named(imported_name))
        }
        TypeData::List(inner) => {
            let imported_inner = import_type(inner, src_doc, dst_doc);
            dst_doc.add_type(TypeData::List(imported_inner))
        }
        TypeData::NonNull(inner) => {
            let imported_inner = import_type(inner, src_doc, dst_doc);
            dst_doc.add_type(TypeData::NonNull(imported_inner))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::printer::print_type;

    #[test]
    fn import_roundtrips_through_the_printer() {
        let mut src = Document::new();
        let name = src.append_input_string("ID");
        let named = src.add_type(TypeData::Named(name));
        let non_null = src.add_type(TypeData::NonNull(named));
        let list_of_non_null_id = src.add_type(TypeData::List(non_null));
        let wrapped = src.add_type(TypeData::NonNull(list_of_non_null_id));

        let mut dst = Document::new();
        let imported = import_type(wrapped, &src, &mut dst);

        assert_eq!(print_type(wrapped, &src), print_type(imported, &dst));
        assert_eq!(print_type(wrapped, &src), "[ID!]!");
    }
}
