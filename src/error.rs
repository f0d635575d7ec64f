//! Error types for harmonica.
//!
//! Errors fall into three groups: domain errors (bad seed, bad parameters,
//! malformed cells), numerical errors (the Laplace system could not be solved)
//! and control errors (the caller cancelled a running computation).

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A cell references a point that does not exist.
    #[error("cell {cell} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The cell index.
        cell: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A cell has fewer than three corners.
    #[error("cell {cell} has {len} corners, at least 3 are required")]
    InvalidCell {
        /// The cell index.
        cell: usize,
        /// Number of corners in the cell.
        len: usize,
    },

    /// The seed point is not part of the mesh.
    #[error("seed vertex {seed} is out of range for a mesh with {num_vertices} vertices")]
    SeedOutOfRange {
        /// The requested seed.
        seed: usize,
        /// Number of points in the mesh.
        num_vertices: usize,
    },

    /// A per-vertex attribute does not match the point count.
    #[error("attribute has {len} entries but the mesh has {num_vertices} vertices")]
    AttributeLength {
        /// Length of the supplied attribute.
        len: usize,
        /// Number of points in the mesh.
        num_vertices: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// The weight at the seed cannot be used to normalize other weights.
    #[error("weight at the seed is {weight}, cannot normalize by it")]
    ZeroSeedWeight {
        /// The offending seed weight.
        weight: f64,
    },

    /// A sparse factorization met a zero pivot.
    #[error("matrix is singular at column {column}")]
    SingularMatrix {
        /// Column where no usable pivot was found.
        column: usize,
    },

    /// The Laplace system could not be solved.
    #[error("Laplace solve failed: {reason}")]
    SolveFailed {
        /// What went wrong.
        reason: String,
    },

    /// The computation was cancelled or ran past its deadline.
    #[error("operation cancelled")]
    Cancelled,
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Returns true for errors raised by a numerical failure rather than bad input.
    pub fn is_numerical(&self) -> bool {
        matches!(self, MeshError::SingularMatrix { .. } | MeshError::SolveFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = MeshError::invalid_param("alpha", 0.7, "must lie in [0, 0.5)");
        assert_eq!(
            err.to_string(),
            "invalid parameter: alpha = 0.7 (must lie in [0, 0.5))"
        );
        assert!(!err.is_numerical());
    }

    #[test]
    fn test_numerical_classification() {
        assert!(MeshError::SingularMatrix { column: 3 }.is_numerical());
        assert!(MeshError::SolveFailed { reason: "nan".into() }.is_numerical());
        assert!(!MeshError::Cancelled.is_numerical());
    }
}
