//! Lineage graph data structures and operations.
//!
//! Members form a multi-parent DAG. Nothing here stores state between calls:
//! every operation takes the full member snapshot, indexes it into a flat
//! slot store, and derives what it needs from scratch.

mod edge;
pub mod edit;
mod generation;
mod index;
mod node;
pub mod query;
mod validator;

pub use edge::{edges, EdgeKey};
pub use generation::{
    affected_generations, annotate, generation_for_new, resolve_generations, GenerationChange,
    ROOT_GENERATION,
};
pub(crate) use generation::resolve_slots;
pub use index::LineageIndex;
pub use node::{Member, MemberStatus, NodeId, Profile};
pub use validator::{validate_move, validate_parent_ids, validate_unlink, MoveValidation};
