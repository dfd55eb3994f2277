// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycut
//!
//! Connectivity and spatial indexing core of a polygon mesh cutting kernel.
//! Provides a half-edge mesh with slot reuse, an implicit bounding volume
//! hierarchy over Morton-ordered primitives, OFF reading and writing, and a
//! preprocessing kernel that shortlists candidate face pairs between a source
//! mesh and a cut mesh.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;

pub use config::KernelConfig;
pub use error::{KernelError, Result};
pub use geometry::{
    BoundingBox, EdgeDescriptor, FaceDescriptor, HalfEdgeMesh, HalfedgeDescriptor, ImplicitBvh,
    MeshBvh, Primitive, VertexDescriptor,
};
pub use io::{parse_off, read_off, write_off};
pub use kernel::{CutKernel, FacePair};

/// Load a source and a cut mesh and shortlist their candidate face pairs
pub fn shortlist_files(
    source: impl AsRef<std::path::Path>,
    cut: impl AsRef<std::path::Path>,
) -> Result<Vec<FacePair>> {
    CutKernel::from_off_files(source, cut, KernelConfig::default())?.shortlist()
}
