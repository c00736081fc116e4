//! Linear (P1) finite elements on planar triangle meshes.
//!
//! Solves `-Δu + u = f` with homogeneous Dirichlet data on tagged boundary
//! segments.

extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod config;
pub mod error;
pub mod fe;
pub mod geometry;
pub mod linalg;
pub mod mesh;
pub mod quadrature;
pub mod shape;
pub mod solution;
pub mod sparse;

pub use config::FemConfig;
pub use error::FemError;

/// Index of a row/column of the galerkin system.
pub type DofIdx = usize;
/// Physical coordinate in the plane.
pub type Coord = na::Point2<f64>;
