//! A GraphQL toolkit for planning upstream fetches: an arena document model,
//! a schema-aware visitor, and an operation planner.
//!
//! The pieces, roughly in the order data flows through them:
//!
//! - [`document`]: the arena AST both incoming operations and planned
//!   upstream operations live in, plus its [`document::importer`],
//!   [`document::normalizer`], and [`document::printer`].
//! - [`schema`]: a thin read-only wrapper over an `apollo_compiler::Schema`.
//! - [`fill`]: parses source text into an incoming [`document::Document`].
//! - [`config`]: the data-source and field-mapping configuration a plan runs
//!   against.
//! - [`visitor`]: the depth-first walk that drives planning.
//! - [`planner`]: the [`visitor::VisitorClient`] that builds upstream
//!   operations and produces a [`plan::Plan`].
//! - [`resolve`]: the fetch/response types a caller drives execution with.
//! - [`error`]: the error and diagnostic types threaded through everything
//!   above.

pub mod config;
pub mod document;
pub mod error;
pub mod fill;
pub mod plan;
pub mod planner;
pub mod resolve;
pub mod schema;
pub mod visitor;

use document::Document;
use document::OperationDefinitionRef;
use error::{PlanResult, Report};
use plan::Plan;

/// Parses `source` against `schema`, then plans it against `config`.
///
/// This is the crate's one-call entry point, tying together [`fill`],
/// [`visitor::walk`] (via [`planner::plan`]), and the document model. Callers
/// who already hold a filled [`Document`] (e.g. one reused across several
/// plans) should call [`planner::plan`] directly instead.
pub fn plan_operation(
    source: &str,
    file_name: &str,
    schema: &schema::Schema,
    config: &config::PlannerConfig,
) -> PlanResult<(Plan, Report)> {
    let (incoming, operation) = fill::fill_from_source(source, file_name, schema)?;
    plan_filled_operation(&incoming, operation, schema, config)
}

/// Plans an already-filled operation. Split out from [`plan_operation`] so
/// callers that fill once and plan many times (e.g. a persisted-query cache)
/// don't pay for re-parsing.
pub fn plan_filled_operation(
    incoming: &Document,
    operation: OperationDefinitionRef,
    schema: &schema::Schema,
    config: &config::PlannerConfig,
) -> PlanResult<(Plan, Report)> {
    planner::plan(incoming, schema, config, operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_compiler::Schema as CompilerSchema;

    fn test_schema() -> schema::Schema {
        let sdl = r#"
            type Query { me: User }
            type User { id: ID! name: String }
        "#;
        schema::Schema::new(CompilerSchema::parse_and_validate(sdl, "schema.graphql").unwrap())
    }

    #[test]
    fn plans_a_single_root_field_fetch() {
        let schema = test_schema();
        let config: config::PlannerConfig = serde_json::from_str(
            r#"{"dataSources": [{"typeName": "Query", "fieldName": "me", "attributes": {"url": "http://upstream"}}]}"#,
        )
        .unwrap();

        let (plan, report) =
            plan_operation("{ me { id } }", "query.graphql", &schema, &config).unwrap();

        assert!(report.is_empty());
        assert_eq!(plan.fetches.len(), 1);
        assert_eq!(plan.fetches[0].buffer_id, 0);
        assert_eq!(plan.fetches[0].input.url, "http://upstream");
        assert_eq!(plan.fetches[0].input.body.query, "{me {id}}");
    }

    #[test]
    fn unmatched_root_fields_produce_no_fetch() {
        let schema = test_schema();
        let config = config::PlannerConfig::default();

        let (plan, _report) =
            plan_operation("{ me { id } }", "query.graphql", &schema, &config).unwrap();

        assert!(plan.fetches.is_empty());
    }
}
