//! Fused element-wise kernels over sparse vectors and CSC matrices.
//!
//! `map` applies a scalar function to equally shaped operands, `broadcast`
//! additionally replicates operands with unit extents. Both visit only
//! positions stored in some operand when `f(0, ..., 0) == 0`, and otherwise
//! produce a fully stored result prefilled with `f(0, ..., 0)`.

mod alloc;
mod broadcast;
pub mod densify;
pub mod fuse;
mod merge;
pub mod options;
pub mod resolve;
pub mod utility;

pub use densify::{densify, densify_vec};
pub use fuse::{
    broadcast, broadcast_into, broadcast_vec, map, map_in_place, map_into, map_vec, FuseReport,
    Fused,
};
pub use options::FuseOptions;
pub use resolve::{broadcast_shape, map_shape, Plan, Policy};
pub use utility::eliminate_zeros::{eliminate_zeros, eliminate_zeros_vec};

pub use sparsefuse_core::{Csc, Element, Error, Operand, SpIndex, SparseVec};
