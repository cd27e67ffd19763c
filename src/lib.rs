//! Resource-allocation state editor and resource-allocation graph (RAG) renderer.
//!
//! The crate keeps an explicit model of P processes × R resource types (Allocation,
//! Maximum, Available), derives the Need matrix and the RAG edge set from it, and lays
//! the graph out on a two-lane canvas. Safety and deadlock verdicts come from an
//! external service, reached through `gateway`.

pub mod coerce;
pub mod config;
pub mod derive;
pub mod dims;
pub mod editor;
pub mod error;
pub mod gateway;
pub mod layout;
pub mod matrix;
pub mod scenario;
pub mod scene;
pub mod status;
pub mod vec2;

#[cfg(test)]
mod testing;

pub use crate::derive::{compute_edges, compute_need, EdgeKind, GraphData, RagEdge, RagEdgeSet};
pub use crate::dims::Dimensions;
pub use crate::editor::Editor;
pub use crate::error::{Error, Result};
pub use crate::matrix::{CellRef, Matrix, MatrixStore};
pub use crate::scene::Scene;

// a resource quantity; a cell value in any of the three containers
pub type Quantity = i64;
