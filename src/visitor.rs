//! Depth-first walk over an incoming operation, handing enter/leave
//! callbacks to a single registered client.
//!
//! Grounded on how `graphql_datasource.go`'s `Planner` consumes `plan.Visitor`:
//! `RegisterFieldVisitor`/`RegisterDocumentVisitor`/`RegisterSelectionSetVisitor`
//! register one client (the planner itself, SPEC_FULL.md only needs one), and
//! the walk exposes `Ancestors`, `EnclosingTypeDefinition`, `IsRootField`,
//! `NextBufferID`, and `FieldMappings` to it as it goes. The definition of
//! `plan.Visitor` itself was not part of the retrieved source, so its shape
//! here is reconstructed from that call-site evidence plus SPEC_FULL.md §4.3.

use crate::config::{DataSourceConfig, FieldMapping, PlannerConfig};
use crate::document::{Document, FieldRef, OperationDefinitionRef, Selection, SelectionSetRef};
use crate::error::Report;
use crate::schema::Schema;

/// One frame of the walk's ancestor stack. `Ancestors[0]` is always the
/// operation being walked, matching `p.v.Ancestors[0].Ref` in the original.
#[derive(Debug, Clone, Copy)]
pub enum Ancestor {
    Operation(OperationDefinitionRef),
    Field(FieldRef),
    SelectionSet(SelectionSetRef),
}

/// Per-walk state exposed to a [`VisitorClient`].
///
/// Lives only for the duration of one [`walk`] call; a planner reaches into
/// it from its callback methods rather than holding its own copy, so that
/// `ancestors`/`enclosing_type` stay authoritative even as the walk recurses.
pub struct Visitor<'a> {
    incoming: &'a Document,
    schema: &'a Schema,
    config: &'a PlannerConfig,
    ancestors: Vec<Ancestor>,
    enclosing_type: Vec<String>,
    next_buffer_id: u32,
    report: Report,
}

impl<'a> Visitor<'a> {
    /// The full ancestor stack, root first.
    pub fn ancestors(&self) -> &[Ancestor] {
        &self.ancestors
    }

    /// The operation this walk started from; `Ancestors[0]` in the original.
    pub fn root_operation(&self) -> OperationDefinitionRef {
        match self.ancestors[0] {
            Ancestor::Operation(op) => op,
            _ => unreachable!("ancestors[0] is always the operation"),
        }
    }

    /// The name of the schema type that owns the selection set currently
    /// being walked, i.e. `EnclosingTypeDefinition.Name(...)`.
    pub fn enclosing_type_name(&self) -> Option<&str> {
        self.enclosing_type.last().map(String::as_str)
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn incoming(&self) -> &Document {
        self.incoming
    }

    pub fn field_mappings(&self) -> &[FieldMapping] {
        &self.config.field_mappings
    }

    /// Allocates the next fetch buffer id. Buffer ids are handed out in
    /// walk order starting at zero and never reused within one plan.
    pub fn next_buffer_id(&mut self) -> u32 {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        id
    }

    pub fn report_mut(&mut self) -> &mut Report {
        &mut self.report
    }

    /// True, with the matching config, iff `field` is a root field of a
    /// data source: its enclosing type and name match a configured
    /// `(type_name, field_name)` pair. Mirrors `p.v.IsRootField(ref)`.
    pub fn is_root_field(&self, field: FieldRef) -> (bool, Option<&DataSourceConfig>) {
        let Some(type_name) = self.enclosing_type_name() else {
            return (false, None);
        };
        let field_name = self.incoming.resolve_str(self.incoming.field(field).name);
        match self.config.find_data_source(type_name, field_name) {
            Some(config) => (true, Some(config)),
            None => (false, None),
        }
    }
}

/// A single registered planner. Every method is a no-op by default so a
/// client only overrides what it cares about, same as the teacher's
/// `FieldVisitor`/`DocumentVisitor`/`SelectionSetVisitor` traits being
/// independently implementable.
pub trait VisitorClient {
    fn enter_document(&mut self, _visitor: &mut Visitor<'_>) {}
    fn leave_document(&mut self, _visitor: &mut Visitor<'_>) {}
    fn enter_selection_set(&mut self, _visitor: &mut Visitor<'_>, _set: SelectionSetRef) {}
    fn leave_selection_set(&mut self, _visitor: &mut Visitor<'_>, _set: SelectionSetRef) {}
    fn enter_field(&mut self, _visitor: &mut Visitor<'_>, _field: FieldRef) {}
    fn leave_field(&mut self, _visitor: &mut Visitor<'_>, _field: FieldRef) {}
}

/// Walks `operation` depth-first, dispatching enter/leave callbacks to
/// `client`, and returns the [`Report`] accumulated along the way.
pub fn walk(
    incoming: &Document,
    schema: &Schema,
    config: &PlannerConfig,
    operation: OperationDefinitionRef,
    client: &mut impl VisitorClient,
) -> Report {
    let mut visitor = Visitor {
        incoming,
        schema,
        config,
        ancestors: vec![Ancestor::Operation(operation)],
        enclosing_type: Vec::new(),
        next_buffer_id: 0,
        report: Report::new(),
    };

    client.enter_document(&mut visitor);

    let op_data = incoming.operation_definition(operation);
    let root_type_name = schema
        .root_operation_type_name(op_data.operation_kind)
        .map(str::to_owned);
    if let Some(root_type_name) = root_type_name {
        let root_set = op_data.selection_set;
        visitor.enclosing_type.push(root_type_name);
        visitor.ancestors.push(Ancestor::SelectionSet(root_set));

        // The operation's own selection set is not announced through
        // `enter_selection_set`/`leave_selection_set`: per `graphql_datasource.go`'s
        // `EnterField`, the upstream root (operation definition + its
        // selection set) is set up lazily the first time a root field is
        // seen, not ahead of time by a generic selection-set callback.
        let selections = incoming.selection_set(root_set).selections.clone();
        for selection in selections {
            if let Selection::Field(field_ref) = selection {
                walk_field(&mut visitor, field_ref, client);
            }
        }

        visitor.ancestors.pop();
        visitor.enclosing_type.pop();
    }

    client.leave_document(&mut visitor);
    visitor.report
}

fn walk_selection_set(
    visitor: &mut Visitor<'_>,
    set: SelectionSetRef,
    client: &mut impl VisitorClient,
) {
    visitor.ancestors.push(Ancestor::SelectionSet(set));
    client.enter_selection_set(visitor, set);

    let selections = visitor.incoming.selection_set(set).selections.clone();
    for selection in selections {
        if let Selection::Field(field_ref) = selection {
            walk_field(visitor, field_ref, client);
        }
        // Fragment spreads and inline fragments are expected to already be
        // normalised away before planning reaches this walk (§9 decision 3);
        // the visitor itself takes no position on them.
    }

    client.leave_selection_set(visitor, set);
    visitor.ancestors.pop();
}

fn walk_field(visitor: &mut Visitor<'_>, field_ref: FieldRef, client: &mut impl VisitorClient) {
    visitor.ancestors.push(Ancestor::Field(field_ref));
    client.enter_field(visitor, field_ref);

    let field_data = visitor.incoming.field(field_ref);
    if let Some(child_set) = field_data.selection_set {
        let field_name = visitor.incoming.resolve_str(field_data.name).to_string();
        let field_type = visitor
            .enclosing_type_name()
            .and_then(|type_name| visitor.schema.field_type(type_name, &field_name));
        let next_type_name = field_type.as_deref().map(strip_type_wrappers);

        if let Some(next_type_name) = next_type_name {
            visitor.enclosing_type.push(next_type_name.to_string());
            walk_selection_set(visitor, child_set, client);
            visitor.enclosing_type.pop();
        } else {
            walk_selection_set(visitor, child_set, client);
        }
    }

    client.leave_field(visitor, field_ref);
    visitor.ancestors.pop();
}

/// Strips `[...]`/`!` wrapping from a printed GraphQL type to get at the
/// named type underneath, e.g. `"[User!]!"` -> `"User"`.
fn strip_type_wrappers(printed: &str) -> &str {
    printed.trim_matches(|c| c == '[' || c == ']' || c == '!')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldData, OperationDefinitionData, OperationKind};
    use apollo_compiler::Schema as CompilerSchema;

    struct RecordingClient {
        entered_fields: Vec<String>,
    }

    impl VisitorClient for RecordingClient {
        fn enter_field(&mut self, visitor: &mut Visitor<'_>, field: FieldRef) {
            let name = visitor.incoming().resolve_str(visitor.incoming().field(field).name);
            self.entered_fields.push(name.to_string());
        }
    }

    fn test_schema() -> Schema {
        let sdl = r#"
            type Query { me: User }
            type User { id: ID! name: String }
        "#;
        Schema::new(CompilerSchema::parse_and_validate(sdl, "schema.graphql").unwrap())
    }

    #[test]
    fn walk_visits_fields_depth_first_and_tracks_enclosing_type() {
        let mut doc = Document::new();
        let inner_set = doc.add_selection_set();
        let id_name = doc.append_input_string("id");
        let id_field = doc.add_field(FieldData {
            name: id_name,
            ..Default::default()
        });
        doc.add_selection(inner_set, Selection::Field(id_field));

        let outer_set = doc.add_selection_set();
        let me_name = doc.append_input_string("me");
        let me_field = doc.add_field(FieldData {
            name: me_name,
            selection_set: Some(inner_set),
            has_selections: true,
            ..Default::default()
        });
        doc.add_selection(outer_set, Selection::Field(me_field));

        let op = doc.add_operation_definition(OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: None,
            variable_definitions: vec![],
            selection_set: outer_set,
        });

        let schema = test_schema();
        let config = PlannerConfig::default();
        let mut client = RecordingClient {
            entered_fields: Vec::new(),
        };
        walk(&doc, &schema, &config, op, &mut client);

        assert_eq!(client.entered_fields, vec!["me", "id"]);
    }

    #[test]
    fn is_root_field_matches_configured_type_and_field_name() {
        let mut doc = Document::new();
        let set = doc.add_selection_set();
        let me_name = doc.append_input_string("me");
        let me_field = doc.add_field(FieldData {
            name: me_name,
            ..Default::default()
        });
        doc.add_selection(set, Selection::Field(me_field));
        let op = doc.add_operation_definition(OperationDefinitionData {
            operation_kind: OperationKind::Query,
            name: None,
            variable_definitions: vec![],
            selection_set: set,
        });

        let schema = test_schema();
        let config: PlannerConfig = serde_json::from_str(
            r#"{"dataSources": [{"typeName": "Query", "fieldName": "me", "attributes": {"url": "http://upstream"}}]}"#,
        )
        .unwrap();

        struct AssertingClient;
        impl VisitorClient for AssertingClient {
            fn enter_field(&mut self, visitor: &mut Visitor<'_>, field: FieldRef) {
                let (is_root, matched) = visitor.is_root_field(field);
                assert!(is_root);
                assert_eq!(matched.unwrap().attributes.url, "http://upstream");
            }
        }

        walk(&doc, &schema, &config, op, &mut AssertingClient);
    }
}
