// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for cut preprocessing
//!
//! Holds a source mesh and a cut mesh, checks that both are usable and
//! narrows the face pairs that may intersect down to those whose bounding
//! boxes overlap.

use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::geometry::{FaceDescriptor, HalfEdgeMesh, MeshBvh};
use crate::io;
use std::path::Path;

/// Candidate `(source face, cut face)` pair
pub type FacePair = (FaceDescriptor, FaceDescriptor);

/// Main kernel for cut preprocessing
pub struct CutKernel {
    source: HalfEdgeMesh,
    cut: HalfEdgeMesh,
    config: KernelConfig,
}

impl CutKernel {
    /// Create a kernel with the default configuration
    pub fn new(source: HalfEdgeMesh, cut: HalfEdgeMesh) -> Self {
        Self::with_config(source, cut, KernelConfig::default())
    }

    pub fn with_config(source: HalfEdgeMesh, cut: HalfEdgeMesh, config: KernelConfig) -> Self {
        Self { source, cut, config }
    }

    /// Load both meshes from OFF files
    pub fn from_off_files(
        source: impl AsRef<Path>,
        cut: impl AsRef<Path>,
        config: KernelConfig,
    ) -> Result<Self> {
        let source = io::read_off(source)?;
        let cut = io::read_off(cut)?;
        Ok(Self::with_config(source, cut, config))
    }

    pub fn source(&self) -> &HalfEdgeMesh {
        &self.source
    }

    pub fn cut(&self) -> &HalfEdgeMesh {
        &self.cut
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Check that both meshes can take part in a cut
    pub fn validate_inputs(&self) -> Result<()> {
        check_mesh(&self.source).map_err(KernelError::InvalidSourceMesh)?;
        check_mesh(&self.cut).map_err(KernelError::InvalidCutMesh)?;
        Ok(())
    }

    /// Face pairs whose bounding boxes overlap, sorted by source then cut face
    pub fn candidate_face_pairs(&self) -> Result<Vec<FacePair>> {
        self.validate_inputs()?;

        let threshold = self.config.parallel_morton_threshold;
        let source_bvh = MeshBvh::build_with_threshold(&self.source, threshold);
        let cut_bvh = MeshBvh::build_with_threshold(&self.cut, threshold);

        let mut pairs = source_bvh.overlapping_faces(&cut_bvh);
        pairs.sort_unstable();
        Ok(pairs)
    }

    /// Like [`Self::candidate_face_pairs`], but an empty result is an error
    pub fn shortlist(&self) -> Result<Vec<FacePair>> {
        let pairs = self.candidate_face_pairs()?;
        if pairs.is_empty() {
            log::info!("no overlapping face pairs between source and cut mesh");
            return Err(KernelError::NoMeshIntersection);
        }

        log::info!(
            "shortlisted {} of {} face pairs",
            pairs.len(),
            self.source.number_of_faces() * self.cut.number_of_faces()
        );
        Ok(pairs)
    }
}

fn check_mesh(mesh: &HalfEdgeMesh) -> std::result::Result<(), String> {
    if mesh.number_of_vertices() < 3 {
        return Err(format!(
            "{} vertices, at least 3 are required",
            mesh.number_of_vertices()
        ));
    }
    if mesh.number_of_faces() == 0 {
        return Err("mesh has no faces".to_string());
    }
    mesh.validate().map_err(|err| err.to_string())
}
