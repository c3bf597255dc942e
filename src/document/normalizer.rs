//! A single idempotent pass over an operation's selection sets.
//!
//! Grounded on `p.operationNormalizer.NormalizeOperation(...)` in
//! `graphql_datasource.go`, scoped down to the three rewrites SPEC_FULL.md
//! §4.6 actually asks for: merging duplicate field selections, canonicalising
//! argument order, and inlining fragment spreads whose definition selects
//! nothing but simple fields (no nested fragments of its own).

use std::collections::HashMap;

use super::{Document, FragmentDefinitionRef, Selection, SelectionSetRef};
use crate::error::{Diagnostic, Report};

/// Normalises every selection set reachable from `root`, in place, and
/// records anything it declined to simplify on `report`.
///
/// Idempotent: running this twice over the same `root` produces the same
/// selection sets the second time as the first (§8 "idempotent
/// normalization").
pub fn normalize_operation(root: SelectionSetRef, doc: &mut Document, report: &mut Report) {
    inline_trivial_fragment_spreads(root, doc, report);
    merge_duplicate_fields(root, doc);
    canonicalize_argument_order(root, doc);

    let children: Vec<SelectionSetRef> = doc
        .selection_set(root)
        .selections
        .iter()
        .filter_map(|s| match s {
            Selection::Field(f) => doc.field(*f).selection_set,
            Selection::InlineFragment(i) => Some(doc.inline_fragment(*i).selection_set),
            Selection::FragmentSpread(_) => None,
        })
        .collect();
    for child in children {
        normalize_operation(child, doc, report);
    }
}

/// Replaces a fragment spread with the selections of the fragment it names,
/// provided that fragment's own selection set contains no further fragment
/// spreads. Fragments that spread other fragments are left alone and a
/// diagnostic is recorded; recursive inlining is not attempted.
fn inline_trivial_fragment_spreads(set: SelectionSetRef, doc: &mut Document, report: &mut Report) {
    let selections = doc.selection_set(set).selections.clone();
    let mut rebuilt = Vec::with_capacity(selections.len());

    for selection in selections {
        match selection {
            Selection::FragmentSpread(spread) => {
                let fragment_name = doc.fragment_spread(spread).fragment_name;
                match find_fragment_definition(doc, fragment_name) {
                    Some(fragment_ref) => {
                        let fragment = doc.fragment_definition(fragment_ref).clone();
                        let inner = doc.selection_set(fragment.selection_set).selections.clone();
                        if inner.iter().any(|s| matches!(s, Selection::FragmentSpread(_))) {
                            report.push(Diagnostic::NormalizationWarning {
                                message: format!(
                                    "fragment spread on '{}' nests another fragment spread; left unexpanded",
                                    doc.resolve_str(fragment_name)
                                ),
                            });
                            rebuilt.push(selection);
                        } else {
                            rebuilt.extend(inner);
                        }
                    }
                    None => {
                        report.push(Diagnostic::NormalizationWarning {
                            message: format!(
                                "fragment spread names unknown fragment '{}'",
                                doc.resolve_str(fragment_name)
                            ),
                        });
                        rebuilt.push(selection);
                    }
                }
            }
            other => rebuilt.push(other),
        }
    }

    doc.selection_set_mut(set).selections = rebuilt;
}

fn find_fragment_definition(
    doc: &Document,
    name: super::ByteSliceReference,
) -> Option<FragmentDefinitionRef> {
    let target = doc.resolve_str(name).to_string();
    doc.fragment_definitions()
        .iter()
        .position(|fragment| doc.resolve_str(fragment.name) == target)
        .map(FragmentDefinitionRef::new)
}

/// Merges sibling field selections that share a response key (alias, or
/// name when unaliased) by concatenating their sub-selections, keeping the
/// position of the first occurrence and dropping the rest.
fn merge_duplicate_fields(set: SelectionSetRef, doc: &mut Document) {
    let selections = doc.selection_set(set).selections.clone();

    let mut merged_subselections: HashMap<String, Vec<Selection>> = HashMap::new();
    let mut non_fields = Vec::new();

    for selection in &selections {
        if let Selection::Field(field_ref) = selection {
            let field = doc.field(*field_ref);
            let key_ref = field.alias.unwrap_or(field.name);
            let key = doc.resolve_str(key_ref).to_string();
            if let Some(child_set) = field.selection_set {
                merged_subselections
                    .entry(key)
                    .or_default()
                    .extend(doc.selection_set(child_set).selections.clone());
            } else {
                merged_subselections.entry(key).or_default();
            }
        } else {
            non_fields.push(selection.clone());
        }
    }

    let mut rebuilt = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for selection in &selections {
        if let Selection::Field(field_ref) = selection {
            let field = doc.field(*field_ref);
            let key_ref = field.alias.unwrap_or(field.name);
            let key = doc.resolve_str(key_ref).to_string();
            if seen.insert(key.clone()) {
                if let Some(child_set) = field.selection_set {
                    let merged = merged_subselections.remove(&key).unwrap_or_default();
                    doc.selection_set_mut(child_set).selections = merged;
                }
                rebuilt.push(*selection);
            }
        }
    }
    rebuilt.extend(non_fields);

    doc.selection_set_mut(set).selections = rebuilt;
}

/// Sorts each field's argument list by argument name, the same
/// canonicalisation `AddArgument` implicitly relies on not mattering for
/// (argument order is insertion order on the wire already; this just makes
/// repeated normalisation passes produce byte-identical output).
fn canonicalize_argument_order(set: SelectionSetRef, doc: &mut Document) {
    let field_refs: Vec<_> = doc
        .selection_set(set)
        .selections
        .iter()
        .filter_map(|s| match s {
            Selection::Field(f) => Some(*f),
            _ => None,
        })
        .collect();

    for field_ref in field_refs {
        let mut arguments = doc.field(field_ref).arguments.clone();
        arguments.sort_by_key(|a| doc.resolve_str(doc.argument(*a).name).to_string());
        doc.field_mut(field_ref).arguments = arguments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ArgumentData, FieldData, OperationKind, ValueData};

    #[test]
    fn merges_duplicate_top_level_selections() {
        let mut doc = Document::new();
        let inner_a = doc.add_selection_set();
        let id_name = doc.append_input_string("id");
        let id_field = doc.add_field(FieldData {
            name: id_name,
            ..Default::default()
        });
        doc.add_selection(inner_a, Selection::Field(id_field));

        let inner_b = doc.add_selection_set();
        let name_name = doc.append_input_string("name");
        let name_field = doc.add_field(FieldData {
            name: name_name,
            ..Default::default()
        });
        doc.add_selection(inner_b, Selection::Field(name_field));

        let outer = doc.add_selection_set();
        let user_name = doc.append_input_string("user");
        let first = doc.add_field(FieldData {
            name: user_name,
            selection_set: Some(inner_a),
            has_selections: true,
            ..Default::default()
        });
        let second = doc.add_field(FieldData {
            name: user_name,
            selection_set: Some(inner_b),
            has_selections: true,
            ..Default::default()
        });
        doc.add_selection(outer, Selection::Field(first));
        doc.add_selection(outer, Selection::Field(second));

        let mut report = Report::new();
        normalize_operation(outer, &mut doc, &mut report);

        let selections = &doc.selection_set(outer).selections;
        assert_eq!(selections.len(), 1);
        let Selection::Field(kept) = selections[0] else {
            panic!("expected a field selection");
        };
        assert_eq!(kept, first);
        let merged_set = doc.field(kept).selection_set.unwrap();
        assert_eq!(doc.selection_set(merged_set).selections.len(), 2);
    }

    #[test]
    fn running_twice_is_a_no_op() {
        let mut doc = Document::new();
        let set = doc.add_selection_set();
        let a_name = doc.append_input_string("a");
        let b_name = doc.append_input_string("b");
        let arg_a_value = doc.add_value(ValueData::Boolean(true));
        let arg_b_value = doc.add_value(ValueData::Boolean(false));
        let arg_a = doc.add_argument(ArgumentData {
            name: b_name,
            value: arg_a_value,
        });
        let arg_b = doc.add_argument(ArgumentData {
            name: a_name,
            value: arg_b_value,
        });
        let field_name = doc.append_input_string("f");
        let field = doc.add_field(FieldData {
            name: field_name,
            arguments: vec![arg_a, arg_b],
            ..Default::default()
        });
        doc.add_selection(set, Selection::Field(field));
        doc.add_operation_definition(crate::document::OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: None,
            variable_definitions: vec![],
            selection_set: set,
        });

        let mut report = Report::new();
        normalize_operation(set, &mut doc, &mut report);
        let once = crate::document::printer::print_operation(
            doc.operation_definitions().next().unwrap(),
            &doc,
        );
        normalize_operation(set, &mut doc, &mut report);
        let twice = crate::document::printer::print_operation(
            doc.operation_definitions().next().unwrap(),
            &doc,
        );
        assert_eq!(once, twice);
    }
}
