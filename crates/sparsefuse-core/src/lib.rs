//! Core data structures and traits for sparsefuse (pure Rust)

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod csc;
pub mod element;
pub mod error;
pub mod index;
pub mod storage;
pub mod vector;

pub use csc::Csc;
pub use element::{DType, Element};
pub use error::{Error, Result};
pub use index::{IndexWidth, SpIndex};
pub use storage::{Operand, SparseStorage};
pub use vector::SparseVec;
