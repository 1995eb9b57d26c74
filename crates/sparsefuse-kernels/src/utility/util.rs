//! Tuning constants shared by the kernels.

/// Below this many cells or stored entries the kernels stay on one thread.
pub const SMALL_NNZ_LIMIT: usize = 32 * 1024;
