//! The arena document model: two parallel ASTs (incoming and upstream),
//! each a set of typed node tables addressed by stable integer references,
//! plus an owned input buffer that names and string/enum values are sliced
//! out of.
//!
//! See SPEC_FULL.md §3 and §4.1. Grounded on the original Go `ast.Document`
//! (`examples/original_source/pkg/document/node.go`'s int-addressed
//! `Node`/`NodeFields() []int` design), translated into a Rust arena with
//! typed references instead of bare `int`.

pub mod importer;
pub mod normalizer;
pub mod printer;
pub mod reference;

pub use reference::{
    ArgumentRef, ByteSliceReference, FieldRef, FragmentDefinitionRef, FragmentSpreadRef,
    InlineFragmentRef, OperationDefinitionRef, SelectionSetRef, TypeRef, ValueRef,
    VariableDefinitionRef,
};

/// GraphQL operation kind, as specified in §3 "Operation definition".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum OperationKind {
    #[display(fmt = "query")]
    Query,
    #[display(fmt = "mutation")]
    Mutation,
    #[display(fmt = "subscription")]
    Subscription,
}

/// A selection within a selection set: a field, a fragment spread, or an
/// inline fragment. Printed in that order within one selection set (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Field(FieldRef),
    FragmentSpread(FragmentSpreadRef),
    InlineFragment(InlineFragmentRef),
}

#[derive(Debug, Clone)]
pub struct OperationDefinitionData {
    pub operation_kind: OperationKind,
    pub name: Option<ByteSliceReference>,
    pub variable_definitions: Vec<VariableDefinitionRef>,
    pub selection_set: SelectionSetRef,
}

#[derive(Debug, Clone)]
pub struct FragmentDefinitionData {
    pub name: ByteSliceReference,
    pub type_condition: ByteSliceReference,
    pub selection_set: SelectionSetRef,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionSetData {
    pub selections: Vec<Selection>,
}

/// A directive application. Only the name and argument set are modeled;
/// this crate has no directive-aware behavior of its own (directives pass
/// through the printer verbatim), so a full directive-definition table
/// would be unused weight.
#[derive(Debug, Clone)]
pub struct DirectiveData {
    pub name: ByteSliceReference,
    pub arguments: Vec<ArgumentRef>,
}

#[derive(Debug, Clone, Default)]
pub struct FieldData {
    pub name: ByteSliceReference,
    pub alias: Option<ByteSliceReference>,
    pub arguments: Vec<ArgumentRef>,
    pub directives: Vec<DirectiveData>,
    pub selection_set: Option<SelectionSetRef>,
    /// True iff `selection_set` is meaningful (invariant 2, §3): the
    /// underlying schema type of this field is an object, interface, or
    /// union.
    pub has_selections: bool,
}

#[derive(Debug, Clone)]
pub struct ArgumentData {
    pub name: ByteSliceReference,
    pub value: ValueRef,
}

#[derive(Debug, Clone)]
pub struct VariableDefinitionData {
    pub variable_name: ByteSliceReference,
    pub ty: TypeRef,
    pub default_value: Option<ValueRef>,
}

#[derive(Debug, Clone, Copy)]
pub enum TypeData {
    Named(ByteSliceReference),
    List(TypeRef),
    NonNull(TypeRef),
}

#[derive(Debug, Clone)]
pub enum ValueData {
    Variable(ByteSliceReference),
    Int(i64),
    Float(f64),
    String(ByteSliceReference),
    Boolean(bool),
    Null,
    Enum(ByteSliceReference),
    List(Vec<ValueRef>),
    /// An object value, or (reused) the field list of an object-field
    /// parse (§8 scenario 6: `foo: "bar"` is an `ArgumentData { name: foo,
    /// value: String("bar") }` used as an object field).
    Object(Vec<ArgumentRef>),
}

#[derive(Debug, Clone)]
pub struct InlineFragmentData {
    pub type_condition: Option<ByteSliceReference>,
    pub selection_set: SelectionSetRef,
}

#[derive(Debug, Clone)]
pub struct FragmentSpreadData {
    pub fragment_name: ByteSliceReference,
}

/// An arena containing one GraphQL AST: an append-only set of typed node
/// tables plus the input buffer they slice names and literal values out of.
///
/// See SPEC_FULL.md §3 "Document" and §4.1. A `Document` is constructed
/// empty, filled (by [`crate::fill`] or by a [`crate::planner`]), optionally
/// normalised in place, serialised, then discarded or [`Document::reset`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    input: Vec<u8>,
    operation_definitions: Vec<OperationDefinitionData>,
    fragment_definitions: Vec<FragmentDefinitionData>,
    selection_sets: Vec<SelectionSetData>,
    fields: Vec<FieldData>,
    arguments: Vec<ArgumentData>,
    variable_definitions: Vec<VariableDefinitionData>,
    types: Vec<TypeData>,
    values: Vec<ValueData>,
    inline_fragments: Vec<InlineFragmentData>,
    fragment_spreads: Vec<FragmentSpreadData>,
}

macro_rules! table_accessors {
    ($field:ident, $data:ty, $reff:ty, $get:ident, $get_mut:ident) => {
        pub fn $get(&self, r: $reff) -> &$data {
            &self.$field[r.index()]
        }

        pub fn $get_mut(&mut self, r: $reff) -> &mut $data {
            &mut self.$field[r.index()]
        }
    };
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // -- input buffer -----------------------------------------------------

    /// Appends `s` to the input buffer and returns a reference to it.
    ///
    /// Per §4.1, dedup-by-equality is allowed but not required; this
    /// implementation always appends, keeping the append-only invariant
    /// trivially true regardless of byte-content comparisons.
    pub fn append_input_string(&mut self, s: &str) -> ByteSliceReference {
        self.append_input_bytes(s.as_bytes())
    }

    pub fn append_input_bytes(&mut self, bytes: &[u8]) -> ByteSliceReference {
        let start = self.input.len();
        self.input.extend_from_slice(bytes);
        ByteSliceReference::new(start, self.input.len())
    }

    pub fn resolve_bytes(&self, r: ByteSliceReference) -> &[u8] {
        &self.input[r.range()]
    }

    pub fn resolve_str(&self, r: ByteSliceReference) -> &str {
        std::str::from_utf8(self.resolve_bytes(r))
            .expect("document input buffer must contain only UTF-8 bytes")
    }

    /// Byte-wise equality of two slice references, which may point into
    /// `self` and `other` respectively (possibly the same document).
    pub fn slice_eq(&self, a: ByteSliceReference, other: &Document, b: ByteSliceReference) -> bool {
        self.resolve_bytes(a) == other.resolve_bytes(b)
    }

    pub fn slice_eq_str(&self, a: ByteSliceReference, s: &str) -> bool {
        self.resolve_str(a) == s
    }

    // -- operation definitions ---------------------------------------------

    pub fn add_operation_definition(&mut self, data: OperationDefinitionData) -> OperationDefinitionRef {
        self.operation_definitions.push(data);
        OperationDefinitionRef::new(self.operation_definitions.len() - 1)
    }

    pub fn operation_definitions(&self) -> impl Iterator<Item = OperationDefinitionRef> {
        (0..self.operation_definitions.len()).map(OperationDefinitionRef::new)
    }

    table_accessors!(
        operation_definitions,
        OperationDefinitionData,
        OperationDefinitionRef,
        operation_definition,
        operation_definition_mut
    );

    pub fn add_variable_definition_to(
        &mut self,
        op: OperationDefinitionRef,
        variable_name: ByteSliceReference,
        ty: TypeRef,
    ) -> VariableDefinitionRef {
        self.variable_definitions.push(VariableDefinitionData {
            variable_name,
            ty,
            default_value: None,
        });
        let var_ref = VariableDefinitionRef::new(self.variable_definitions.len() - 1);
        self.operation_definition_mut(op).variable_definitions.push(var_ref);
        var_ref
    }

    table_accessors!(
        variable_definitions,
        VariableDefinitionData,
        VariableDefinitionRef,
        variable_definition,
        variable_definition_mut
    );

    // -- fragment definitions ------------------------------------------------

    pub fn add_fragment_definition(&mut self, data: FragmentDefinitionData) -> FragmentDefinitionRef {
        self.fragment_definitions.push(data);
        FragmentDefinitionRef::new(self.fragment_definitions.len() - 1)
    }

    pub fn fragment_definitions(&self) -> &[FragmentDefinitionData] {
        &self.fragment_definitions
    }

    table_accessors!(
        fragment_definitions,
        FragmentDefinitionData,
        FragmentDefinitionRef,
        fragment_definition,
        fragment_definition_mut
    );

    // -- selection sets ----------------------------------------------------

    pub fn add_selection_set(&mut self) -> SelectionSetRef {
        self.selection_sets.push(SelectionSetData::default());
        SelectionSetRef::new(self.selection_sets.len() - 1)
    }

    /// Appends `selection` to the end of `into_set`'s selection list,
    /// preserving insertion order (§4.1).
    pub fn add_selection(&mut self, into_set: SelectionSetRef, selection: Selection) {
        self.selection_set_mut(into_set).selections.push(selection);
    }

    table_accessors!(
        selection_sets,
        SelectionSetData,
        SelectionSetRef,
        selection_set,
        selection_set_mut
    );

    // -- fields --------------------------------------------------------------

    pub fn add_field(&mut self, data: FieldData) -> FieldRef {
        self.fields.push(data);
        FieldRef::new(self.fields.len() - 1)
    }

    pub fn add_argument_to_field(&mut self, field: FieldRef, argument: ArgumentRef) {
        self.field_mut(field).arguments.push(argument);
    }

    table_accessors!(fields, FieldData, FieldRef, field, field_mut);

    // -- arguments -----------------------------------------------------------

    pub fn add_argument(&mut self, data: ArgumentData) -> ArgumentRef {
        self.arguments.push(data);
        ArgumentRef::new(self.arguments.len() - 1)
    }

    /// Creates a `name: $variable_name` argument (not yet attached to any
    /// field) and returns both the underlying variable value and the
    /// argument wrapping it, mirroring the original's
    /// `AddVariableValueArgument` which returns `(variableValueRef, argRef)`.
    pub fn add_variable_value_argument(
        &mut self,
        name: ByteSliceReference,
        var_name_ref: ByteSliceReference,
    ) -> (ValueRef, ArgumentRef) {
        let value_ref = self.add_value(ValueData::Variable(var_name_ref));
        let arg_ref = self.add_argument(ArgumentData {
            name,
            value: value_ref,
        });
        (value_ref, arg_ref)
    }

    table_accessors!(arguments, ArgumentData, ArgumentRef, argument, argument_mut);

    // -- types -----------------------------------------------------------------

    pub fn add_type(&mut self, data: TypeData) -> TypeRef {
        self.types.push(data);
        TypeRef::new(self.types.len() - 1)
    }

    table_accessors!(types, TypeData, TypeRef, ty, ty_mut);

    // -- values ------------------------------------------------------------------

    pub fn add_value(&mut self, data: ValueData) -> ValueRef {
        self.values.push(data);
        ValueRef::new(self.values.len() - 1)
    }

    table_accessors!(values, ValueData, ValueRef, value, value_mut);

    // -- fragments -----------------------------------------------------------------

    pub fn add_inline_fragment(&mut self, data: InlineFragmentData) -> InlineFragmentRef {
        self.inline_fragments.push(data);
        InlineFragmentRef::new(self.inline_fragments.len() - 1)
    }

    table_accessors!(
        inline_fragments,
        InlineFragmentData,
        InlineFragmentRef,
        inline_fragment,
        inline_fragment_mut
    );

    pub fn add_fragment_spread(&mut self, data: FragmentSpreadData) -> FragmentSpreadRef {
        self.fragment_spreads.push(data);
        FragmentSpreadRef::new(self.fragment_spreads.len() - 1)
    }

    table_accessors!(
        fragment_spreads,
        FragmentSpreadData,
        FragmentSpreadRef,
        fragment_spread,
        fragment_spread_mut
    );

    /// Clears every table and the input buffer in O(1) amortised (§3
    /// "Lifecycle"). References obtained before a reset are invalid
    /// afterwards; nothing checks that at runtime, by design (the whole
    /// point of reset is to avoid paying for validation on the hot path).
    pub fn reset(&mut self) {
        self.input.clear();
        self.operation_definitions.clear();
        self.fragment_definitions.clear();
        self.selection_sets.clear();
        self.fields.clear();
        self.arguments.clear();
        self.variable_definitions.clear();
        self.types.clear();
        self.values.clear();
        self.inline_fragments.clear();
        self.fragment_spreads.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.operation_definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_input_returns_distinct_references_even_for_equal_bytes() {
        let mut doc = Document::new();
        let a = doc.append_input_string("id");
        let b = doc.append_input_string("id");
        assert!(doc.slice_eq(a, &doc, b));
        assert_eq!(doc.resolve_str(a), "id");
        assert_eq!(doc.resolve_str(b), "id");
    }

    #[test]
    fn reset_clears_every_table() {
        let mut doc = Document::new();
        let set = doc.add_selection_set();
        let name = doc.append_input_string("me");
        let field = doc.add_field(FieldData {
            name,
            ..Default::default()
        });
        doc.add_selection(set, Selection::Field(field));
        doc.add_operation_definition(OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: None,
            variable_definitions: vec![],
            selection_set: set,
        });
        assert!(!doc.is_empty());
        doc.reset();
        assert!(doc.is_empty());
        assert_eq!(doc.input.len(), 0);
        assert_eq!(doc.selection_sets.len(), 0);
    }

    #[test]
    fn add_selection_preserves_insertion_order() {
        let mut doc = Document::new();
        let set = doc.add_selection_set();
        let mut refs = Vec::new();
        for name in ["a", "b", "c"] {
            let name_ref = doc.append_input_string(name);
            let field = doc.add_field(FieldData {
                name: name_ref,
                ..Default::default()
            });
            doc.add_selection(set, Selection::Field(field));
            refs.push(field);
        }
        let selections = &doc.selection_set(set).selections;
        assert_eq!(selections.len(), 3);
        for (selection, expected) in selections.iter().zip(refs) {
            assert_eq!(*selection, Selection::Field(expected));
        }
    }
}
