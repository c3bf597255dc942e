//! The finished output of planning: a tree shaped like the downstream
//! selection set, with a [`Fetch`] attached wherever a subtree's data comes
//! from a distinct upstream request.
//!
//! Simplified from the teacher's own `query_plan` module (`PlanNode`/`FetchNode`
//! in `examples/apollographql-federation-next`'s composition path): no defer,
//! no subscription variant, no nested dependent fetches, since SPEC_FULL.md's
//! Non-goals exclude federation composition and this planner only ever
//! produces flat, independent root-field fetches (§9 decision 2). List-typed
//! fields still need their own node shape, so `Array` is kept (§3 "Plan").

use crate::resolve::Fetch;

/// One node of the output plan, shaped like the downstream selection set.
/// Any variant may carry a `Fetch`: it is set exactly on the node that is
/// the root of that fetch's subtree, never on its descendants.
#[derive(Debug, Clone)]
pub enum PlanNode {
    /// A selection set: each entry is a response key paired with the
    /// sub-plan for that field's value.
    Object {
        fetch: Option<Fetch>,
        fields: Vec<(String, PlanNode)>,
    },
    /// A list-typed field's value: every element shares `of`'s shape.
    Array { fetch: Option<Fetch>, of: Box<PlanNode> },
    /// A field whose own value needs no further unpacking (it was already
    /// resolved, or resolving it is the caller's job once `fetch` comes
    /// back).
    Leaf { fetch: Option<Fetch> },
}

impl PlanNode {
    pub fn fetch(&self) -> Option<&Fetch> {
        match self {
            PlanNode::Object { fetch, .. } | PlanNode::Array { fetch, .. } | PlanNode::Leaf { fetch } => {
                fetch.as_ref()
            }
        }
    }

    pub(crate) fn set_fetch(&mut self, new_fetch: Fetch) {
        match self {
            PlanNode::Object { fetch, .. } | PlanNode::Array { fetch, .. } | PlanNode::Leaf { fetch } => {
                *fetch = Some(new_fetch);
            }
        }
    }
}

/// A complete plan for one operation: the fetches to run, in the order they
/// were discovered during planning, and the response-shaped tree describing
/// how to assemble their results.
#[derive(Debug, Clone)]
pub struct Plan {
    pub fetches: Vec<Fetch>,
    pub root: PlanNode,
}

impl Plan {
    pub fn new(fetches: Vec<Fetch>, root: PlanNode) -> Self {
        Self { fetches, root }
    }
}
