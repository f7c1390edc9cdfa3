//! Error types for the `agroswarm-world` crate.
//!
//! Grid lookups by [`Position`](agroswarm_types::Position) return
//! [`WorldError`] when the coordinate is off the field.

/// Errors that can occur during field-grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A coordinate lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} field")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
}
