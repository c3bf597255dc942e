//! Deterministic serialisation of a [`Document`] back to GraphQL text.
//!
//! Grounded on `p.printer.Print(p.operation, nil, buf)` in the original
//! `graphql_datasource.go`; the Go side hands off to a separate printer
//! package, which this crate folds into one function per SPEC_FULL.md §4.5.

use super::{
    ArgumentRef, Document, FieldRef, FragmentSpreadRef, InlineFragmentRef, OperationDefinitionData,
    OperationDefinitionRef, OperationKind, Selection, SelectionSetRef, TypeData, TypeRef, ValueData,
    ValueRef,
};

/// Prints a complete operation (and, if it has any, the fragment
/// definitions the document carries) as GraphQL text.
///
/// Selections within one selection set print fields, then fragment
/// spreads, then inline fragments, each group in insertion order (§4.5).
pub fn print_operation(op: OperationDefinitionRef, doc: &Document) -> String {
    let mut out = String::new();
    print_operation_into(&mut out, op, doc);
    for fragment in doc.fragment_definitions() {
        out.push(' ');
        out.push_str("fragment ");
        out.push_str(doc.resolve_str(fragment.name));
        out.push_str(" on ");
        out.push_str(doc.resolve_str(fragment.type_condition));
        out.push(' ');
        print_selection_set(&mut out, fragment.selection_set, doc);
    }
    out
}

fn print_operation_into(out: &mut String, op: OperationDefinitionRef, doc: &Document) {
    let OperationDefinitionData {
        operation_kind,
        name,
        variable_definitions,
        selection_set,
    } = doc.operation_definition(op);

    let is_shorthand_query = matches!(operation_kind, OperationKind::Query)
        && name.is_none()
        && variable_definitions.is_empty();

    if !is_shorthand_query {
        out.push_str(&operation_kind.to_string());
        if let Some(name) = name {
            out.push(' ');
            out.push_str(doc.resolve_str(*name));
        }
        if !variable_definitions.is_empty() {
            out.push('(');
            for (i, var_ref) in variable_definitions.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let var = doc.variable_definition(*var_ref);
                out.push('$');
                out.push_str(doc.resolve_str(var.variable_name));
                out.push_str(": ");
                out.push_str(&print_type(var.ty, doc));
                if let Some(default) = var.default_value {
                    out.push_str(" = ");
                    print_value(out, default, doc);
                }
            }
            out.push(')');
        }
        out.push(' ');
    }
    print_selection_set(out, *selection_set, doc);
}

pub fn print_type(type_ref: TypeRef, doc: &Document) -> String {
    let mut out = String::new();
    print_type_into(&mut out, type_ref, doc);
    out
}

fn print_type_into(out: &mut String, type_ref: TypeRef, doc: &Document) {
    match *doc.ty(type_ref) {
        TypeData::Named(name) => out.push_str(doc.resolve_str(name)),
        TypeData::List(inner) => {
            out.push('[');
            print_type_into(out, inner, doc);
            out.push(']');
        }
        TypeData::NonNull(inner) => {
            print_type_into(out, inner, doc);
            out.push('!');
        }
    }
}

fn print_selection_set(out: &mut String, set: SelectionSetRef, doc: &Document) {
    let selections = &doc.selection_set(set).selections;

    let fields: Vec<FieldRef> = selections
        .iter()
        .filter_map(|s| match s {
            Selection::Field(r) => Some(*r),
            _ => None,
        })
        .collect();
    let spreads: Vec<FragmentSpreadRef> = selections
        .iter()
        .filter_map(|s| match s {
            Selection::FragmentSpread(r) => Some(*r),
            _ => None,
        })
        .collect();
    let inline_fragments: Vec<InlineFragmentRef> = selections
        .iter()
        .filter_map(|s| match s {
            Selection::InlineFragment(r) => Some(*r),
            _ => None,
        })
        .collect();

    out.push('{');
    let mut first = true;
    for field in fields {
        if !first {
            out.push(' ');
        }
        first = false;
        print_field(out, field, doc);
    }
    for spread in spreads {
        if !first {
            out.push(' ');
        }
        first = false;
        out.push_str("...");
        out.push_str(doc.resolve_str(doc.fragment_spread(spread).fragment_name));
    }
    for inline in inline_fragments {
        if !first {
            out.push(' ');
        }
        first = false;
        out.push_str("...");
        let data = doc.inline_fragment(inline);
        if let Some(type_condition) = data.type_condition {
            out.push_str(" on ");
            out.push_str(doc.resolve_str(type_condition));
        }
        out.push(' ');
        print_selection_set(out, data.selection_set, doc);
    }
    out.push('}');
}

fn print_field(out: &mut String, field_ref: FieldRef, doc: &Document) {
    let field = doc.field(field_ref);
    if let Some(alias) = field.alias {
        out.push_str(doc.resolve_str(alias));
        out.push_str(": ");
    }
    out.push_str(doc.resolve_str(field.name));
    if !field.arguments.is_empty() {
        out.push('(');
        print_arguments(out, &field.arguments, doc);
        out.push(')');
    }
    for directive in &field.directives {
        out.push(' ');
        out.push('@');
        out.push_str(doc.resolve_str(directive.name));
        if !directive.arguments.is_empty() {
            out.push('(');
            print_arguments(out, &directive.arguments, doc);
            out.push(')');
        }
    }
    if field.has_selections {
        if let Some(set) = field.selection_set {
            out.push(' ');
            print_selection_set(out, set, doc);
        }
    }
}

fn print_arguments(out: &mut String, arguments: &[ArgumentRef], doc: &Document) {
    for (i, arg_ref) in arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let arg = doc.argument(*arg_ref);
        out.push_str(doc.resolve_str(arg.name));
        out.push_str(": ");
        print_value(out, arg.value, doc);
    }
}

fn print_value(out: &mut String, value_ref: ValueRef, doc: &Document) {
    match doc.value(value_ref) {
        ValueData::Variable(name) => {
            out.push('$');
            out.push_str(doc.resolve_str(*name));
        }
        ValueData::Int(n) => out.push_str(&n.to_string()),
        ValueData::Float(f) => out.push_str(&f.to_string()),
        ValueData::String(s) => {
            out.push('"');
            out.push_str(doc.resolve_str(*s));
            out.push('"');
        }
        ValueData::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        ValueData::Null => out.push_str("null"),
        ValueData::Enum(name) => out.push_str(doc.resolve_str(*name)),
        ValueData::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_value(out, *item, doc);
            }
            out.push(']');
        }
        ValueData::Object(fields) => {
            out.push('{');
            print_arguments(out, fields, doc);
            out.push('}');
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::document::{ArgumentData, FieldData, OperationDefinitionData, Selection, TypeData, ValueData};

    #[test]
    fn prints_a_simple_query_without_the_query_keyword() {
        let mut doc = Document::new();
        let inner_set = doc.add_selection_set();
        let id_name = doc.append_input_string("id");
        let id_field = doc.add_field(FieldData {
            name: id_name,
            ..Default::default()
        });
        doc.add_selection(inner_set, Selection::Field(id_field));

        let outer_set = doc.add_selection_set();
        let user_name = doc.append_input_string("user");
        let user_field = doc.add_field(FieldData {
            name: user_name,
            selection_set: Some(inner_set),
            has_selections: true,
            ..Default::default()
        });
        doc.add_selection(outer_set, Selection::Field(user_field));

        let op = doc.add_operation_definition(OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: None,
            variable_definitions: vec![],
            selection_set: outer_set,
        });

        assert_eq!(print_operation(op, &doc), "{user {id}}");
    }

    #[test]
    fn prints_a_named_query_with_a_variable_alias_and_nested_selections() {
        let mut doc = Document::new();

        let id_name = doc.append_input_string("id");
        let id_field = doc.add_field(FieldData {
            name: id_name,
            ..Default::default()
        });
        let name_name = doc.append_input_string("name");
        let name_field = doc.add_field(FieldData {
            name: name_name,
            ..Default::default()
        });
        let result_fields_set = doc.add_selection_set();
        doc.add_selection(result_fields_set, Selection::Field(id_field));
        doc.add_selection(result_fields_set, Selection::Field(name_field));

        let results_name = doc.append_input_string("results");
        let results_field = doc.add_field(FieldData {
            name: results_name,
            selection_set: Some(result_fields_set),
            has_selections: true,
            ..Default::default()
        });

        let total_name = doc.append_input_string("total");
        let total_field = doc.add_field(FieldData {
            name: total_name,
            ..Default::default()
        });

        let search_children_set = doc.add_selection_set();
        doc.add_selection(search_children_set, Selection::Field(results_field));
        doc.add_selection(search_children_set, Selection::Field(total_field));

        let limit_var = doc.append_input_string("limit");
        let int_name = doc.append_input_string("Int");
        let int_type = doc.add_type(TypeData::Named(int_name));
        let non_null_int = doc.add_type(TypeData::NonNull(int_type));

        let first_name = doc.append_input_string("first");
        let limit_value = doc.add_value(ValueData::Variable(limit_var));
        let first_arg = doc.add_argument(ArgumentData {
            name: first_name,
            value: limit_value,
        });
        let search_alias = doc.append_input_string("s");
        let search_name = doc.append_input_string("search");
        let search_field = doc.add_field(FieldData {
            name: search_name,
            alias: Some(search_alias),
            arguments: vec![first_arg],
            selection_set: Some(search_children_set),
            has_selections: true,
            ..Default::default()
        });

        let outer_set = doc.add_selection_set();
        doc.add_selection(outer_set, Selection::Field(search_field));

        let search_query_name = doc.append_input_string("Search");
        let op = doc.add_operation_definition(OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: Some(search_query_name),
            variable_definitions: vec![],
            selection_set: outer_set,
        });
        doc.add_variable_definition_to(op, limit_var, non_null_int);

        assert_snapshot!(print_operation(op, &doc), @"query Search($limit: Int!) {s: search(first: $limit) {results {id name} total}}");
    }
}
