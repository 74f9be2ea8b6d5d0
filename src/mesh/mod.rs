//! Core mesh data structures.
//!
//! This module provides the indexed [`Mesh`] entity produced by every importer
//! and the typed attribute storage it is built from.
//!
//! # Overview
//!
//! A [`Mesh`] owns one flat index buffer, a [`Topology`] tag and one
//! [`AttributeArray`] per [`Semantic`]. All attribute arrays have the same
//! length, so a single index addresses a complete vertex:
//!
//! ```
//! use tessera::mesh::{AttributeArray, Mesh, Semantic, Topology};
//! use nalgebra::{Point3, Vector3};
//!
//! let positions = AttributeArray::Point3(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]);
//! let normals = AttributeArray::Vector3(vec![Vector3::z(); 3]);
//!
//! let mesh = Mesh::assemble(
//!     Topology::Triangles,
//!     vec![0, 1, 2],
//!     3,
//!     vec![(Semantic::Position, positions), (Semantic::Normal, normals)],
//! )
//! .unwrap();
//!
//! assert_eq!(mesh.normals().unwrap()[1], Vector3::z());
//! ```

mod attribute;
mod data;

pub use attribute::{ArrayElement, AttributeArray, ElementKind, Semantic};
pub use data::{Mesh, Topology};
