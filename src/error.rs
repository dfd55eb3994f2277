// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the connectivity core, the OFF reader and input validation

use thiserror::Error;

/// Result type alias using [`KernelError`]
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors raised by mesh construction, OFF parsing and input validation
#[derive(Error, Debug)]
pub enum KernelError {
    /// A null descriptor was passed where a live element is required
    #[error("null {kind} descriptor")]
    NullDescriptor { kind: &'static str },

    /// A descriptor refers to a slot that was never allocated or has been removed
    #[error("{kind} {index} does not exist or has been removed")]
    RemovedDescriptor { kind: &'static str, index: usize },

    /// A face needs at least three vertices
    #[error("face has {count} vertices, at least 3 are required")]
    TooFewFaceVertices { count: usize },

    /// The same vertex appears twice in one face
    #[error("vertex {vertex} appears more than once in face")]
    DuplicateFaceVertex { vertex: usize },

    /// An edge was requested between a vertex and itself
    #[error("cannot connect vertex {vertex} to itself")]
    DegenerateEdge { vertex: usize },

    /// The half-edge `source -> target` already belongs to a face
    #[error("halfedge {halfedge} ({source_vertex} -> {target_vertex}) is already bound to face {face}")]
    HalfedgeAlreadyBound {
        halfedge: usize,
        source_vertex: usize,
        target_vertex: usize,
        face: usize,
    },

    /// An edge cannot be removed while a face still uses it
    #[error("edge {edge} is still used by a face")]
    EdgeInUse { edge: usize },

    /// A vertex cannot be removed while edges are incident to it
    #[error("vertex {vertex} still has {incident} incident halfedges")]
    VertexInUse { vertex: usize, incident: usize },

    /// Connectivity check failed
    #[error("connectivity invariant violated: {0}")]
    InvariantViolation(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The OFF header line is missing
    #[error("OFF header not found")]
    MissingHeader,

    /// The first line is not the OFF token
    #[error("unrecognised OFF header: {0:?}")]
    BadHeader(String),

    /// The element count line is missing or incomplete
    #[error("OFF element counts not found")]
    MissingCounts,

    /// Fewer vertex lines than announced
    #[error("OFF vertex {index} not found")]
    MissingVertex { index: usize },

    /// Fewer face lines than announced
    #[error("OFF face {index} not found")]
    MissingFace { index: usize },

    /// A vertex or face line has fewer values than required
    #[error("line {line}: expected {expected} values, found {found}")]
    ShortLine {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A token could not be parsed as a number
    #[error("line {line}: invalid number {token:?}")]
    BadNumber { line: usize, token: String },

    /// A face line declares fewer than three vertices
    #[error("line {line}: invalid polygon vertex count ({count})")]
    FaceTooSmall { line: usize, count: usize },

    /// A face references a vertex outside the vertex block
    #[error("line {line}: vertex index {index} out of range (vertex count {vertex_count})")]
    FaceIndexOutOfRange {
        line: usize,
        index: usize,
        vertex_count: usize,
    },

    /// A polygon references a position that was never supplied
    #[error("polygon {polygon}: vertex index {index} out of range (vertex count {vertex_count})")]
    PolygonIndexOutOfRange {
        polygon: usize,
        index: usize,
        vertex_count: usize,
    },

    /// The source mesh cannot be cut
    #[error("invalid source mesh: {0}")]
    InvalidSourceMesh(String),

    /// The cut mesh cannot be used as a cutting surface
    #[error("invalid cut mesh: {0}")]
    InvalidCutMesh(String),

    /// No face of the cut mesh comes near the source mesh
    #[error("source mesh and cut mesh do not overlap")]
    NoMeshIntersection,
}

impl KernelError {
    /// Build the error for a stale or unknown descriptor
    pub fn removed(kind: &'static str, index: usize) -> Self {
        KernelError::RemovedDescriptor { kind, index }
    }
}
