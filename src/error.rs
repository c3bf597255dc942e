use std::fmt::Debug;

/// A single cause of a planning failure.
///
/// Mirrors the distinction the spec draws between fatal plan-time errors
/// (configuration, printer) and everything else, which is collected into a
/// [`Report`] instead of aborting the walk.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SinglePlanError {
    #[error("malformed data-source configuration: {message}")]
    Configuration { message: String },

    #[error("failed to serialize upstream document: {message}")]
    Printer { message: String },

    #[error("internal invariant violated: {message}")]
    Internal { message: String },
}

/// The error type returned by fallible operations in this crate.
///
/// Plan-time failures are always a single [`SinglePlanError`]; this wrapper
/// exists (rather than using `SinglePlanError` directly) so that callers can
/// match on `PlanError` uniformly even as the set of fatal causes grows.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlanError(#[from] pub SinglePlanError);

impl PlanError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self(SinglePlanError::Internal {
            message: message.into(),
        })
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self(SinglePlanError::Configuration {
            message: message.into(),
        })
    }

    pub fn printer(message: impl Into<String>) -> Self {
        Self(SinglePlanError::Printer {
            message: message.into(),
        })
    }
}

/// A non-fatal diagnostic recorded while planning or normalising.
///
/// Unlike [`PlanError`], a `Diagnostic` never aborts the walk that produced
/// it; the finished plan is still returned to the caller alongside the
/// accumulated [`Report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A field had no matching entry in the field-mappings table; the
    /// downstream name was used upstream unchanged. Not an error.
    MappingMiss { type_name: String, field_name: String },
    /// The normalizer could not simplify something it was asked to (e.g. a
    /// fragment spread it didn't recognize as trivially inlineable).
    NormalizationWarning { message: String },
    /// An `objectField`-sourced argument was configured; this revision has
    /// no specified behavior for it (see SPEC_FULL.md §9), so it was
    /// accepted but not rewritten.
    UnimplementedArgumentSource { field_name: String, argument_name: String },
}

/// Accumulates non-fatal diagnostics produced over the course of one plan.
///
/// A `Report` is per-plan: a fresh one is created for every call to
/// [`crate::planner::plan`] and handed back to the caller alongside the
/// [`crate::plan::Plan`] it diagnoses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
