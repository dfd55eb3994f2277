// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - connectivity, bounding volumes and spatial indexing

mod bbox;
mod descriptor;
mod halfedge;
mod primitives;
mod slots;
pub mod bvh;

pub use bbox::BoundingBox;
pub use bvh::{ImplicitBvh, MeshBvh};
pub use descriptor::{
    Descriptor, EdgeDescriptor, FaceDescriptor, HalfedgeDescriptor, VertexDescriptor,
};
pub use halfedge::HalfEdgeMesh;
pub use primitives::Primitive;
