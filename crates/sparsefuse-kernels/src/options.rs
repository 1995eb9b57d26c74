//! Per-call configuration of the fused kernels.

/// Knobs for a fused `map`/`broadcast` call.
///
/// The defaults are what the free functions (`map`, `broadcast`, ...) use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseOptions {
    pub(crate) capacity_hint: Option<usize>,
    pub(crate) growth_factor: usize,
    pub(crate) specialized: bool,
}

impl Default for FuseOptions {
    fn default() -> Self {
        Self {
            capacity_hint: None,
            growth_factor: 2,
            specialized: true,
        }
    }
}

impl FuseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial stored-entry capacity, replacing the resolver's upper bound.
    ///
    /// An underestimate is legal; the result storage grows as needed.
    #[must_use]
    pub const fn capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = Some(capacity);
        self
    }

    /// Multiplier applied to the occupied length when storage runs out.
    /// Values below 2 are raised to 2.
    #[must_use]
    pub const fn growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = if factor < 2 { 2 } else { factor };
        self
    }

    /// Enables (default) or disables the one- and two-operand scan loops.
    /// With `false` every call goes through the general N-operand loop.
    #[must_use]
    pub const fn specialized(mut self, on: bool) -> Self {
        self.specialized = on;
        self
    }
}
