//! The visitor client that turns an incoming operation into a [`Plan`].
//!
//! Grounded line for line on the `Planner` type in
//! `examples/original_source/pkg/engine/datasource/graphqldatasource/graphql_datasource.go`:
//! `EnterDocument` (reset), `EnterField` (root-fetch setup + field copy +
//! argument hoisting), `EnterSelectionSet`/`LeaveSelectionSet` (nested
//! selection sets), `LeaveDocument` (normalize, print, assemble `Fetch`).
//! Generalised from "one planner instance per data source" to "one planner
//! client that groups root fields by which data source they match" per
//! SPEC_FULL.md §9 decision 2 — see the module-level comment on
//! [`crate::visitor`] for why that generalisation was necessary.

pub mod arguments;

use indexmap::IndexMap;

use crate::config::PlannerConfig;
use crate::document::{
    Document, FieldData, FieldRef, OperationDefinitionData, OperationDefinitionRef, Selection,
    SelectionSetRef,
};
use crate::error::{PlanResult, Report};
use crate::plan::{Plan, PlanNode};
use crate::resolve::{Fetch, FetchBody, FetchInput, VariableTemplate};
use crate::schema::Schema;
use crate::visitor::{self, Visitor, VisitorClient};

/// One upstream request under construction: its own scratch document (never
/// sharing an input buffer or reference with the incoming document, per the
/// two-document discipline), and the stack of upstream nodes the walk is
/// currently appending new selections into.
struct FetchBuilder {
    buffer_id: u32,
    url: String,
    upstream: Document,
    upstream_op: OperationDefinitionRef,
    /// Mirrors `p.nodes`: the selection set (or, while inside a field,
    /// the field) new selections append under. Always non-empty once the
    /// root has been set up.
    nodes: Vec<UpstreamNode>,
    variables: VariableTemplate,
    body_variables: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Copy)]
enum UpstreamNode {
    SelectionSet(SelectionSetRef),
    Field(FieldRef),
}

impl FetchBuilder {
    fn current_selection_set(&self) -> SelectionSetRef {
        match self.nodes.last().expect("fetch builder always has an active node") {
            UpstreamNode::SelectionSet(set) => *set,
            UpstreamNode::Field(field) => self
                .upstream
                .field(*field)
                .selection_set
                .expect("a field only becomes the active node once it has a selection set"),
        }
    }
}

/// The response-shaped tree being assembled during the walk, before any
/// `Fetch` has actually been printed. `FetchRoot` marks the node where a
/// real `Fetch` (keyed by url) must be spliced in once [`plan`] has finished
/// assembling every builder's upstream document.
enum ShapeNode {
    Object(Vec<(String, ShapeNode)>),
    Array(Box<ShapeNode>),
    Leaf,
    FetchRoot(String, Box<ShapeNode>),
}

impl ShapeNode {
    fn into_plan_node(self, fetch_by_url: &IndexMap<String, Fetch>) -> PlanNode {
        match self {
            ShapeNode::Object(fields) => PlanNode::Object {
                fetch: None,
                fields: fields
                    .into_iter()
                    .map(|(key, child)| (key, child.into_plan_node(fetch_by_url)))
                    .collect(),
            },
            ShapeNode::Array(of) => PlanNode::Array {
                fetch: None,
                of: Box::new(of.into_plan_node(fetch_by_url)),
            },
            ShapeNode::Leaf => PlanNode::Leaf { fetch: None },
            ShapeNode::FetchRoot(url, inner) => {
                let fetch = fetch_by_url
                    .get(&url)
                    .expect("every fetch root's url has a matching fetch")
                    .clone();
                let mut node = inner.into_plan_node(fetch_by_url);
                node.set_fetch(fetch);
                node
            }
        }
    }
}

/// Per-field bookkeeping pushed in `enter_field` and popped in `leave_field`,
/// carrying what's needed to place the field's finished [`ShapeNode`] once
/// its subtree (if any) has been walked.
struct FieldFrame {
    response_key: String,
    is_list: bool,
    fetch_root_url: Option<String>,
}

/// Walks the incoming operation once, grouping root fields by the data
/// source they match (identified by its configured `url`, since a
/// `DataSourceConfig` is otherwise keyed one-to-one with a single field) and
/// producing one [`Fetch`] per group.
struct PlannerClient {
    downstream_op: OperationDefinitionRef,
    builders: IndexMap<String, FetchBuilder>,
    /// Parallel to the walk's nesting: which builder key (data source url)
    /// new selections under the current field/selection-set belong to, if
    /// any.
    active: Vec<Option<String>>,
    /// Stack of in-progress selection sets' children, response-tree side.
    /// Seeded with one frame for the operation's own root selection set,
    /// which (like the upstream builder's root) is never pushed/popped via
    /// `enter_selection_set`/`leave_selection_set`.
    shape_children: Vec<Vec<(String, ShapeNode)>>,
    /// One frame per currently open field, popped by the matching `leave_field`.
    field_frames: Vec<FieldFrame>,
    /// The finished shape of the field just closed by `leave_selection_set`,
    /// consumed by the very next `leave_field` (its owner).
    pending_object: Option<Vec<(String, ShapeNode)>>,
}

impl VisitorClient for PlannerClient {
    fn enter_field(&mut self, visitor: &mut Visitor<'_>, field: FieldRef) {
        let (is_root, matched_config) = visitor.is_root_field(field);
        let type_name = visitor.enclosing_type_name().unwrap_or_default().to_string();
        let field_name = visitor.incoming().resolve_str(visitor.incoming().field(field).name).to_string();

        let already_active = self.active.last().cloned().flatten();
        let starts_new_root = is_root && already_active.is_none();
        let key = if starts_new_root {
            let config = matched_config.expect("is_root_field returned a config");
            let key = config.attributes.url.clone();
            if !self.builders.contains_key(&key) {
                let buffer_id = visitor.next_buffer_id();
                let op_kind = visitor
                    .incoming()
                    .operation_definition(self.downstream_op)
                    .operation_kind;
                let mut upstream = Document::new();
                let root_set = upstream.add_selection_set();
                let upstream_op = upstream.add_operation_definition(OperationDefinitionData {
                    operation_kind: op_kind,
                    name: None,
                    variable_definitions: vec![],
                    selection_set: root_set,
                });
                self.builders.insert(
                    key.clone(),
                    FetchBuilder {
                        buffer_id,
                        url: config.attributes.url.clone(),
                        upstream,
                        upstream_op,
                        nodes: vec![UpstreamNode::SelectionSet(root_set)],
                        variables: VariableTemplate::new(),
                        body_variables: serde_json::Map::new(),
                    },
                );
            }
            Some(key)
        } else {
            already_active
        };

        self.active.push(key.clone());

        let Some(key) = key else {
            return;
        };

        let is_list = visitor
            .schema()
            .field_type(&type_name, &field_name)
            .is_some_and(|printed| printed.contains('['));
        self.field_frames.push(FieldFrame {
            response_key: field_name.clone(),
            is_list,
            fetch_root_url: if starts_new_root { Some(key.clone()) } else { None },
        });

        let builder = self.builders.get_mut(&key).expect("builder was just ensured to exist");

        let mapped_name = field_mapping_rename(visitor.field_mappings(), &type_name, &field_name)
            .map(str::to_string);
        let upstream_name = match &mapped_name {
            Some(name) => name.as_str(),
            None => {
                visitor.report_mut().push(crate::error::Diagnostic::MappingMiss {
                    type_name: type_name.clone(),
                    field_name: field_name.clone(),
                });
                field_name.as_str()
            }
        };
        let name_ref = builder.upstream.append_input_string(upstream_name);
        let field_ref = builder.upstream.add_field(FieldData {
            name: name_ref,
            ..Default::default()
        });
        let parent_set = builder.current_selection_set();
        builder.upstream.add_selection(parent_set, Selection::Field(field_ref));
        builder.nodes.push(UpstreamNode::Field(field_ref));

        if is_root {
            if let Some(config) = matched_config {
                if let Some(arguments_config) = &config.attributes.arguments {
                    if let Some(field_config) = arguments_config
                        .fields
                        .iter()
                        .find(|f| f.field_name == field_name)
                    {
                        arguments::apply_field_arguments(
                            &field_config.arguments,
                            field_ref,
                            field,
                            self.downstream_op,
                            visitor.incoming(),
                            &mut builder.upstream,
                            builder.upstream_op,
                            &mut builder.variables,
                            &mut builder.body_variables,
                            visitor.report_mut(),
                        );
                    }
                }
            }
        }
    }

    fn leave_field(&mut self, _visitor: &mut Visitor<'_>, _field: FieldRef) {
        let Some(key) = self.active.pop().flatten() else {
            return;
        };
        let builder = self.builders.get_mut(&key).expect("builder must still exist");
        builder.nodes.pop();

        let frame = self.field_frames.pop().expect("a frame was pushed for every active field");
        let base = match self.pending_object.take() {
            Some(fields) => ShapeNode::Object(fields),
            None => ShapeNode::Leaf,
        };
        let shaped = if frame.is_list { ShapeNode::Array(Box::new(base)) } else { base };
        let node = match frame.fetch_root_url {
            Some(url) => ShapeNode::FetchRoot(url, Box::new(shaped)),
            None => shaped,
        };
        self.shape_children
            .last_mut()
            .expect("root shape frame always present")
            .push((frame.response_key, node));
    }

    fn enter_selection_set(&mut self, _visitor: &mut Visitor<'_>, set: SelectionSetRef) {
        let Some(Some(key)) = self.active.last().cloned() else {
            return;
        };
        let builder = self.builders.get_mut(&key).expect("builder must still exist");
        let new_set = builder.upstream.add_selection_set();
        if let Some(UpstreamNode::Field(parent_field)) = builder.nodes.last() {
            let parent_field = *parent_field;
            let data = builder.upstream.field_mut(parent_field);
            data.selection_set = Some(new_set);
            data.has_selections = true;
        }
        builder.nodes.push(UpstreamNode::SelectionSet(new_set));
        let _ = set;

        self.shape_children.push(Vec::new());
    }

    fn leave_selection_set(&mut self, _visitor: &mut Visitor<'_>, _set: SelectionSetRef) {
        let Some(Some(key)) = self.active.last().cloned() else {
            return;
        };
        let builder = self.builders.get_mut(&key).expect("builder must still exist");
        builder.nodes.pop();

        let fields = self.shape_children.pop().expect("pushed by the matching enter_selection_set");
        self.pending_object = Some(fields);
    }
}

fn field_mapping_rename<'a>(
    mappings: &'a [crate::config::FieldMapping],
    type_name: &str,
    field_name: &str,
) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| m.type_name == type_name && m.field_name == field_name)
        .and_then(|m| m.upstream_name())
}

/// Plans `operation` (an operation definition in `incoming`) against
/// `schema` and `config`, returning one [`Fetch`] per distinct data source
/// its root fields touch, a response-shaped [`Plan`], and a [`Report`] of
/// anything non-fatal the walk noticed along the way.
pub fn plan(
    incoming: &Document,
    schema: &Schema,
    config: &PlannerConfig,
    operation: OperationDefinitionRef,
) -> PlanResult<(Plan, Report)> {
    let mut client = PlannerClient {
        downstream_op: operation,
        builders: IndexMap::new(),
        active: Vec::new(),
        shape_children: vec![Vec::new()],
        field_frames: Vec::new(),
        pending_object: None,
    };

    let mut report = visitor::walk(incoming, schema, config, operation, &mut client);

    let mut fetch_by_url: IndexMap<String, Fetch> = IndexMap::with_capacity(client.builders.len());

    for (url, mut builder) in client.builders {
        let mut normalize_report = Report::new();
        crate::document::normalizer::normalize_operation(
            {
                let op_data = builder.upstream.operation_definition(builder.upstream_op);
                op_data.selection_set
            },
            &mut builder.upstream,
            &mut normalize_report,
        );
        for diagnostic in normalize_report.diagnostics() {
            report.push(diagnostic.clone());
        }

        let query = crate::document::printer::print_operation(builder.upstream_op, &builder.upstream);

        let fetch = Fetch {
            buffer_id: builder.buffer_id,
            input: FetchInput {
                url: builder.url,
                body: FetchBody {
                    query,
                    variables: builder.body_variables,
                },
            },
        };
        fetch_by_url.insert(url, fetch);
    }

    let fetches: Vec<Fetch> = fetch_by_url.values().cloned().collect();
    let root_fields = client
        .shape_children
        .pop()
        .expect("root shape frame always present");
    let root_children = root_fields
        .into_iter()
        .map(|(response_key, node)| (response_key, node.into_plan_node(&fetch_by_url)))
        .collect();

    let plan = Plan::new(fetches, PlanNode::Object { fetch: None, fields: root_children });
    Ok((plan, report))
}
