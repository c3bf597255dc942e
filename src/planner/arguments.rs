//! Argument hoisting: turning a downstream variable-valued argument into a
//! context-variable binding on the fetch, and importing its type onto the
//! upstream operation.
//!
//! Grounded line for line on `applyFieldArgument` in
//! `examples/original_source/pkg/engine/datasource/graphqldatasource/graphql_datasource.go`
//! (lines ~160-188).

use crate::config::{Argument, ArgumentSource};
use crate::document::importer::import_type;
use crate::document::{Document, FieldRef, OperationDefinitionRef, ValueData};
use crate::error::{Diagnostic, Report};
use crate::resolve::{ContextVariable, VariableTemplate};

/// Applies every argument in `arguments` (the config for one field) to
/// `upstream_field`, reading argument values off `downstream_field` in
/// `incoming`.
#[allow(clippy::too_many_arguments)]
pub fn apply_field_arguments(
    arguments: &[Argument],
    upstream_field: FieldRef,
    downstream_field: FieldRef,
    downstream_op: OperationDefinitionRef,
    incoming: &Document,
    upstream: &mut Document,
    upstream_op: OperationDefinitionRef,
    variables: &mut VariableTemplate,
    body_variables: &mut serde_json::Map<String, serde_json::Value>,
    report: &mut Report,
) {
    for argument in arguments {
        match argument.source {
            ArgumentSource::FieldArgument => {
                apply_field_argument(
                    argument,
                    upstream_field,
                    downstream_field,
                    downstream_op,
                    incoming,
                    upstream,
                    upstream_op,
                    variables,
                    body_variables,
                );
            }
            ArgumentSource::ObjectField => {
                report.push(Diagnostic::UnimplementedArgumentSource {
                    field_name: incoming
                        .resolve_str(incoming.field(downstream_field).name)
                        .to_string(),
                    argument_name: argument.name.clone(),
                });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_field_argument(
    argument: &Argument,
    upstream_field: FieldRef,
    downstream_field: FieldRef,
    downstream_op: OperationDefinitionRef,
    incoming: &Document,
    upstream: &mut Document,
    upstream_op: OperationDefinitionRef,
    variables: &mut VariableTemplate,
    body_variables: &mut serde_json::Map<String, serde_json::Value>,
) {
    let Some(downstream_arg_ref) = incoming
        .field(downstream_field)
        .arguments
        .iter()
        .find(|a| incoming.resolve_str(incoming.argument(**a).name) == argument.name)
    else {
        return;
    };
    let downstream_arg = incoming.argument(*downstream_arg_ref);

    let ValueData::Variable(variable_name_ref) = incoming.value(downstream_arg.value) else {
        return;
    };
    let variable_name = incoming.resolve_str(*variable_name_ref).to_string();

    let mut path = vec![variable_name.clone()];
    path.extend(argument.source_path.iter().cloned());
    let (placeholder, existed) = variables.add_variable(ContextVariable { path });

    let upstream_arg_name = upstream.append_input_string(&argument.name);
    let upstream_var_name = upstream.append_input_string(&variable_name);
    let (_, arg_ref) = upstream.add_variable_value_argument(upstream_arg_name, upstream_var_name);
    upstream.add_argument_to_field(upstream_field, arg_ref);

    if existed {
        return;
    }

    body_variables.insert(variable_name.clone(), serde_json::Value::String(placeholder));

    for var_ref in &incoming.operation_definition(downstream_op).variable_definitions {
        let var_def = incoming.variable_definition(*var_ref);
        if incoming.resolve_str(var_def.variable_name) != variable_name {
            continue;
        }
        let imported_type = import_type(var_def.ty, incoming, upstream);
        upstream.add_variable_definition_to(upstream_op, upstream_var_name, imported_type);
        break;
    }
}
