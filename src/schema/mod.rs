//! A thin, read-only view over a parsed schema.
//!
//! Grounded on the teacher's `FederationSchema` (`examples/apollographql-federation-next/src/schema/mod.rs`),
//! which wraps `apollo_compiler::Schema` rather than re-parsing it; this
//! crate does the same, but narrows the surface to exactly what the visitor
//! and planner need: field types, for building the upstream operation's
//! variable definitions, and "is this a composite type" (object, interface,
//! or union), for invariant 2 in SPEC_FULL.md §3 (`has_selections`).

use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema as CompilerSchema;

/// Wraps a validated `apollo_compiler::Schema`.
///
/// Construction (parsing and validating SDL text) happens in [`crate::fill`];
/// by the time a `Schema` reaches the visitor or planner it is assumed valid,
/// matching the teacher's own separation between schema-building and
/// schema-consuming code.
pub struct Schema {
    inner: CompilerSchema,
}

impl Schema {
    pub fn new(inner: CompilerSchema) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &CompilerSchema {
        &self.inner
    }

    /// The root operation type's name for `kind`, if the schema defines one.
    pub fn root_operation_type_name(&self, kind: crate::document::OperationKind) -> Option<&str> {
        use crate::document::OperationKind;
        let name = match kind {
            OperationKind::Query => &self.inner.schema_definition.query,
            OperationKind::Mutation => &self.inner.schema_definition.mutation,
            OperationKind::Subscription => &self.inner.schema_definition.subscription,
        };
        name.as_ref().map(|n| n.name.as_str())
    }

    /// The declared type of `field_name` on `type_name`, printed as GraphQL
    /// type syntax (`"[ID!]!"`, `"String"`, ...), if both the type and the
    /// field exist.
    pub fn field_type(&self, type_name: &str, field_name: &str) -> Option<String> {
        let fields = match self.inner.types.get(type_name)? {
            ExtendedType::Object(def) => &def.fields,
            ExtendedType::Interface(def) => &def.fields,
            _ => return None,
        };
        fields.get(field_name).map(|f| f.ty.to_string())
    }

    /// True iff `type_name` is an object, interface, or union type, i.e. a
    /// field of this type may carry a non-empty selection set.
    pub fn is_composite_type(&self, type_name: &str) -> bool {
        matches!(
            self.inner.types.get(type_name),
            Some(ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_))
        )
    }
}
