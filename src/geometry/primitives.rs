// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygonal primitive generators
//!
//! Handy source meshes and cutting surfaces for tests, benchmarks and the CLI.
//! Closed primitives are oriented counter-clockwise seen from outside.

use super::HalfEdgeMesh;
use crate::error::Result;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box made of six quads
    Cube { size: Vector3<f64>, center: bool },
    /// Extruded regular polygon: two n-gon caps and n quad sides
    Prism { h: f64, r: f64, segments: u32 },
    /// Open sheet of `nx * ny` quads in the plane `z`, centred on the z axis
    Grid { nx: u32, ny: u32, size: f64, z: f64 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn prism(h: f64, r: f64, segments: u32) -> Self {
        Self::Prism {
            h,
            r,
            segments: segments.max(3),
        }
    }

    pub fn grid(nx: u32, ny: u32, size: f64, z: f64) -> Self {
        Self::Grid {
            nx: nx.max(1),
            ny: ny.max(1),
            size,
            z,
        }
    }

    /// Vertex positions and polygons indexing into them
    pub fn polygons(&self) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        match self {
            Self::Cube { size, center } => cube_polygons(*size, *center),
            Self::Prism { h, r, segments } => prism_polygons(*h, *r, *segments as usize),
            Self::Grid { nx, ny, size, z } => grid_polygons(*nx as usize, *ny as usize, *size, *z),
        }
    }

    pub fn to_mesh(&self) -> Result<HalfEdgeMesh> {
        let (positions, polygons) = self.polygons();
        HalfEdgeMesh::from_polygons(&positions, &polygons)
    }
}

fn cube_polygons(size: Vector3<f64>, center: bool) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    let positions = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = vec![
        vec![0, 3, 2, 1], // z-
        vec![4, 5, 6, 7], // z+
        vec![0, 1, 5, 4], // y-
        vec![2, 3, 7, 6], // y+
        vec![1, 2, 6, 5], // x+
        vec![0, 4, 7, 3], // x-
    ];

    (positions, faces)
}

fn prism_polygons(height: f64, radius: f64, segments: usize) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let mut positions = Vec::with_capacity(2 * segments);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        positions.push(Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
    }
    for i in 0..segments {
        let p = positions[i];
        positions.push(Point3::new(p.x, p.y, height));
    }

    let bottom = |i: usize| i % segments;
    let top = |i: usize| segments + i % segments;

    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(segments + 2);
    faces.push((0..segments).rev().map(bottom).collect());
    faces.push((0..segments).map(top).collect());
    for i in 0..segments {
        faces.push(vec![bottom(i), bottom(i + 1), top(i + 1), top(i)]);
    }

    (positions, faces)
}

fn grid_polygons(nx: usize, ny: usize, size: f64, z: f64) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let half = size / 2.0;
    let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            positions.push(Point3::new(
                -half + size * i as f64 / nx as f64,
                -half + size * j as f64 / ny as f64,
                z,
            ));
        }
    }

    let at = |i: usize, j: usize| j * (nx + 1) + i;
    let mut faces = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            faces.push(vec![at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }

    (positions, faces)
}
