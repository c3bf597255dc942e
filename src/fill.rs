//! Fills a [`crate::document::Document`] from a parsed, validated
//! `apollo_compiler` AST.
//!
//! This is the "external parser" the document model itself deliberately
//! does not implement (SPEC_FULL.md §1 Non-goals): lexing and grammar-level
//! parsing are delegated to `apollo_compiler`, already part of the teacher's
//! dependency stack, and this module is the seam between its borrowed,
//! `Name`/`Node`-based AST and this crate's owned, integer-referenced arena.

use apollo_compiler::ast::OperationType;
use apollo_compiler::executable::{
    Field as CompilerField, Operation as CompilerOperation, Selection as CompilerSelection,
    SelectionSet as CompilerSelectionSet,
};
use apollo_compiler::{ast, ExecutableDocument, Node};

use crate::document::{
    ArgumentData, ByteSliceReference, Document, FieldData, FragmentDefinitionData,
    FragmentSpreadData, InlineFragmentData, OperationDefinitionData, OperationKind, Selection,
    SelectionSetRef, TypeData, TypeRef, ValueData, ValueRef,
};
use crate::schema::Schema;

/// Parses and validates `source` as an executable document against `schema`,
/// then fills a fresh [`Document`] with its operations and fragments.
///
/// Returns the new `Document` together with the reference of whichever
/// operation definition corresponds to `apollo_compiler`'s "the" operation
/// (the anonymous one, or the sole named one); planning a document with more
/// than one operation and no `operationName` is out of scope, matching the
/// teacher's own single-operation assumption in its federation entry points.
pub fn fill_from_source(
    source: &str,
    file_name: &str,
    schema: &Schema,
) -> Result<(Document, crate::document::OperationDefinitionRef), crate::error::PlanError> {
    let executable = ExecutableDocument::parse_and_validate(schema.inner(), source, file_name)
        .map_err(|err| crate::error::PlanError::configuration(err.to_string()))?;
    fill_from_executable(&executable, schema)
}

fn fill_from_executable(
    executable: &ExecutableDocument,
    schema: &Schema,
) -> Result<(Document, crate::document::OperationDefinitionRef), crate::error::PlanError> {
    let mut doc = Document::new();

    for (_, fragment) in executable.fragments.iter() {
        let name = doc.append_input_string(fragment.name.as_str());
        let type_condition = doc.append_input_string(fragment.type_condition().as_str());
        let selection_set = fill_selection_set(&fragment.selection_set, &mut doc, schema);
        doc.add_fragment_definition(FragmentDefinitionData {
            name,
            type_condition,
            selection_set,
        });
    }

    let mut operation_ref = None;
    for operation in executable.operations.iter() {
        let this_ref = fill_operation(operation, &mut doc, schema);
        operation_ref = Some(this_ref);
    }

    operation_ref
        .map(|op| (doc, op))
        .ok_or_else(|| crate::error::PlanError::configuration("document contains no operation"))
}

fn fill_operation(
    operation: &Node<CompilerOperation>,
    doc: &mut Document,
    schema: &Schema,
) -> crate::document::OperationDefinitionRef {
    let operation_kind = match operation.operation_type {
        OperationType::Query => OperationKind::Query,
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Subscription => OperationKind::Subscription,
    };
    let name = operation.name.as_ref().map(|n| doc.append_input_string(n.as_str()));
    let selection_set = fill_selection_set(&operation.selection_set, doc, schema);

    let op_ref = doc.add_operation_definition(OperationDefinitionData {
        operation_kind,
        name,
        variable_definitions: vec![],
        selection_set,
    });

    for variable in &operation.variables {
        let variable_name = doc.append_input_string(variable.name.as_str());
        let ty = fill_type(&variable.ty, doc);
        doc.add_variable_definition_to(op_ref, variable_name, ty);
    }

    op_ref
}

fn fill_selection_set(
    selection_set: &CompilerSelectionSet,
    doc: &mut Document,
    schema: &Schema,
) -> SelectionSetRef {
    let set_ref = doc.add_selection_set();
    for selection in &selection_set.selections {
        let filled = match selection {
            CompilerSelection::Field(field) => Selection::Field(fill_field(field, doc, schema)),
            CompilerSelection::FragmentSpread(spread) => {
                let fragment_name = doc.append_input_string(spread.fragment_name.as_str());
                Selection::FragmentSpread(doc.add_fragment_spread(FragmentSpreadData { fragment_name }))
            }
            CompilerSelection::InlineFragment(inline) => {
                let type_condition = inline
                    .type_condition
                    .as_ref()
                    .map(|t| doc.append_input_string(t.as_str()));
                let inner = fill_selection_set(&inline.selection_set, doc, schema);
                Selection::InlineFragment(doc.add_inline_fragment(InlineFragmentData {
                    type_condition,
                    selection_set: inner,
                }))
            }
        };
        doc.add_selection(set_ref, filled);
    }
    set_ref
}

fn fill_field(field: &Node<CompilerField>, doc: &mut Document, schema: &Schema) -> crate::document::FieldRef {
    let name = doc.append_input_string(field.name.as_str());
    let alias = field.alias.as_ref().map(|a| doc.append_input_string(a.as_str()));
    let has_selections =
        !field.selection_set.selections.is_empty() || doc_field_is_composite(field, schema);
    let selection_set = if field.selection_set.selections.is_empty() {
        None
    } else {
        Some(fill_selection_set(&field.selection_set, doc, schema))
    };

    let field_ref = doc.add_field(FieldData {
        name,
        alias,
        arguments: vec![],
        directives: vec![],
        selection_set,
        has_selections,
    });

    for argument in &field.arguments {
        let arg_name = doc.append_input_string(argument.name.as_str());
        let value = fill_value(&argument.value, doc);
        let arg_ref = doc.add_argument(ArgumentData { name: arg_name, value });
        doc.add_argument_to_field(field_ref, arg_ref);
    }

    field_ref
}

/// `apollo_compiler` resolves `field.selection_set.ty` against the schema
/// regardless of whether any selections were written, so a field whose type
/// is an object/interface/union carries `has_selections = true` even when its
/// selection set happens to be empty (not reachable from valid GraphQL text,
/// but a caller filling fields by hand, as the planner does, can produce it).
fn doc_field_is_composite(field: &Node<CompilerField>, schema: &Schema) -> bool {
    schema.is_composite_type(field.selection_set.ty.as_str())
}

fn fill_type(ty: &ast::Type, doc: &mut Document) -> TypeRef {
    match ty {
        ast::Type::Named(name) => {
            let name_ref = doc.append_input_string(name.as_str());
            doc.add_type(TypeData::Named(name_ref))
        }
        ast::Type::NonNullNamed(name) => {
            let name_ref = doc.append_input_string(name.as_str());
            let named = doc.add_type(TypeData::Named(name_ref));
            doc.add_type(TypeData::NonNull(named))
        }
        ast::Type::List(inner) => {
            let inner_ref = fill_type(inner, doc);
            doc.add_type(TypeData::List(inner_ref))
        }
        ast::Type::NonNullList(inner) => {
            let inner_ref = fill_type(inner, doc);
            let list = doc.add_type(TypeData::List(inner_ref));
            doc.add_type(TypeData::NonNull(list))
        }
    }
}

fn fill_value(value: &ast::Value, doc: &mut Document) -> ValueRef {
    let data = match value {
        ast::Value::Null => ValueData::Null,
        ast::Value::Boolean(b) => ValueData::Boolean(*b),
        ast::Value::Int(i) => ValueData::Int(i.to_string().parse().unwrap_or_default()),
        ast::Value::Float(f) => ValueData::Float(f.to_string().parse().unwrap_or_default()),
        ast::Value::String(s) => ValueData::String(doc.append_input_string(s)),
        ast::Value::Enum(e) => ValueData::Enum(doc.append_input_string(e.as_str())),
        ast::Value::Variable(v) => ValueData::Variable(doc.append_input_string(v.as_str())),
        ast::Value::List(items) => {
            let refs: Vec<ValueRef> = items.iter().map(|item| fill_value(item, doc)).collect();
            ValueData::List(refs)
        }
        ast::Value::Object(fields) => {
            let refs: Vec<_> = fields
                .iter()
                .map(|(name, value)| {
                    let name_ref: ByteSliceReference = doc.append_input_string(name.as_str());
                    let value_ref = fill_value(value, doc);
                    doc.add_argument(ArgumentData {
                        name: name_ref,
                        value: value_ref,
                    })
                })
                .collect();
            ValueData::Object(refs)
        }
    };
    doc.add_value(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::Schema as CompilerSchema;

    fn schema() -> Schema {
        let sdl = r#"
            type Query { me: User user(id: ID!): User }
            type User { id: ID! name: String }
        "#;
        Schema::new(CompilerSchema::parse_and_validate(sdl, "schema.graphql").unwrap())
    }

    #[test]
    fn fills_a_simple_query() {
        let schema = schema();
        let (doc, op) = fill_from_source("{ me { id } }", "op.graphql", &schema).unwrap();
        assert_eq!(
            crate::document::printer::print_operation(op, &doc),
            "{me {id}}"
        );
    }

    #[test]
    fn fills_variable_definitions() {
        let schema = schema();
        let (doc, op) =
            fill_from_source("query Q($x: ID!) { user(id: $x) { name } }", "op.graphql", &schema)
                .unwrap();
        let printed = crate::document::printer::print_operation(op, &doc);
        assert_eq!(printed, "query Q($x: ID!) {user(id: $x) {name}}");
    }
}
