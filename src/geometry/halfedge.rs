// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh representation for robust cutting operations
//! This provides the topological connectivity every cutting and stitching stage reads and mutates
//!
//! Elements live in dense slot arrays addressed by descriptors. Removing an
//! element never re-indexes the others; its descriptor is queued and handed
//! out again by the next creation call of the same category.

use super::bbox::BoundingBox;
use super::descriptor::{EdgeDescriptor, FaceDescriptor, HalfedgeDescriptor, VertexDescriptor};
use super::slots::Slots;
use crate::error::{KernelError, Result};
use nalgebra::Point3;

/// Vertex payload: position plus the halfedges pointing at it
#[derive(Debug, Clone)]
struct VertexData {
    position: Point3<f64>,
    /// Incoming halfedges (target == this vertex), duplicate free
    halfedges: Vec<HalfedgeDescriptor>,
}

/// Half-edge in a half-edge mesh
/// Each edge has two half-edges, one for each direction
#[derive(Debug, Clone, Copy)]
struct HalfedgeData {
    /// Vertex this half-edge points to
    target: VertexDescriptor,
    /// Twin half-edge (opposite direction)
    opposite: HalfedgeDescriptor,
    /// Next half-edge around the face
    next: HalfedgeDescriptor,
    /// Previous half-edge around the face
    prev: HalfedgeDescriptor,
    edge: EdgeDescriptor,
    /// Null while the half-edge is a border
    face: FaceDescriptor,
}

impl HalfedgeData {
    fn unlinked(target: VertexDescriptor) -> Self {
        Self {
            target,
            opposite: HalfedgeDescriptor::null(),
            next: HalfedgeDescriptor::null(),
            prev: HalfedgeDescriptor::null(),
            edge: EdgeDescriptor::null(),
            face: FaceDescriptor::null(),
        }
    }
}

/// Edge connecting two vertices
#[derive(Debug, Clone, Copy)]
struct EdgeData {
    /// Primary half-edge; the other one is its opposite
    halfedge: HalfedgeDescriptor,
}

#[derive(Debug, Clone, Default)]
struct FaceData {
    /// Boundary half-edges in traversal order
    halfedges: Vec<HalfedgeDescriptor>,
}

/// Half-edge mesh with full topological connectivity and slot reuse
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    vertices: Slots<VertexDescriptor, VertexData>,
    edges: Slots<EdgeDescriptor, EdgeData>,
    halfedges: Slots<HalfedgeDescriptor, HalfedgeData>,
    faces: Slots<FaceDescriptor, FaceData>,
}

impl HalfEdgeMesh {
    /// Create an empty half-edge mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given element counts
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        let mut mesh = Self::new();
        mesh.reserve(vertices, faces);
        mesh
    }

    /// Reserve slots for `vertices` more vertices and `faces` more faces.
    /// Edge storage is sized from the Euler estimate for closed triangle meshes.
    pub fn reserve(&mut self, vertices: usize, faces: usize) {
        let edges = vertices.saturating_add(faces);
        self.vertices.reserve(vertices);
        self.faces.reserve(faces);
        self.edges.reserve(edges);
        self.halfedges.reserve(edges.saturating_mul(2));
    }

    /// Build a mesh from positions and polygons given as indices into `positions`
    pub fn from_polygons(positions: &[Point3<f64>], polygons: &[Vec<usize>]) -> Result<Self> {
        let mut mesh = Self::with_capacity(positions.len(), polygons.len());
        let vertices: Vec<VertexDescriptor> =
            positions.iter().map(|p| mesh.add_vertex(*p)).collect();

        let mut face = Vec::new();
        for (p, polygon) in polygons.iter().enumerate() {
            face.clear();
            for &i in polygon {
                let v = vertices
                    .get(i)
                    .copied()
                    .ok_or(KernelError::PolygonIndexOutOfRange {
                        polygon: p,
                        index: i,
                        vertex_count: vertices.len(),
                    })?;
                face.push(v);
            }
            mesh.add_face(&face)?;
        }

        log::debug!(
            "built half-edge mesh: {} vertices, {} edges, {} faces",
            mesh.number_of_vertices(),
            mesh.number_of_edges(),
            mesh.number_of_faces()
        );
        Ok(mesh)
    }

    // Counting
    // --------

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.live_len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.live_len()
    }

    pub fn number_of_halfedges(&self) -> usize {
        self.halfedges.live_len()
    }

    pub fn number_of_faces(&self) -> usize {
        self.faces.live_len()
    }

    pub fn number_of_internal_vertices(&self) -> usize {
        self.vertices.internal_len()
    }

    pub fn number_of_internal_edges(&self) -> usize {
        self.edges.internal_len()
    }

    pub fn number_of_internal_halfedges(&self) -> usize {
        self.halfedges.internal_len()
    }

    pub fn number_of_internal_faces(&self) -> usize {
        self.faces.internal_len()
    }

    pub fn number_of_vertices_removed(&self) -> usize {
        self.vertices.removed_len()
    }

    pub fn number_of_edges_removed(&self) -> usize {
        self.edges.removed_len()
    }

    pub fn number_of_halfedges_removed(&self) -> usize {
        self.halfedges.removed_len()
    }

    pub fn number_of_faces_removed(&self) -> usize {
        self.faces.removed_len()
    }

    // Liveness
    // --------

    pub fn contains_vertex(&self, v: VertexDescriptor) -> bool {
        self.vertices.is_live(v)
    }

    pub fn contains_edge(&self, e: EdgeDescriptor) -> bool {
        self.edges.is_live(e)
    }

    pub fn contains_halfedge(&self, h: HalfedgeDescriptor) -> bool {
        self.halfedges.is_live(h)
    }

    pub fn contains_face(&self, f: FaceDescriptor) -> bool {
        self.faces.is_live(f)
    }

    pub fn is_removed_vertex(&self, v: VertexDescriptor) -> bool {
        self.vertices.is_removed(v)
    }

    pub fn is_removed_edge(&self, e: EdgeDescriptor) -> bool {
        self.edges.is_removed(e)
    }

    pub fn is_removed_halfedge(&self, h: HalfedgeDescriptor) -> bool {
        self.halfedges.is_removed(h)
    }

    pub fn is_removed_face(&self, f: FaceDescriptor) -> bool {
        self.faces.is_removed(f)
    }

    // Iteration
    // ---------

    /// Live vertices in descriptor order
    pub fn vertices(&self) -> impl Iterator<Item = VertexDescriptor> + '_ {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeDescriptor> + '_ {
        self.edges.iter()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HalfedgeDescriptor> + '_ {
        self.halfedges.iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceDescriptor> + '_ {
        self.faces.iter()
    }

    // Creation
    // --------

    /// Add a vertex, reusing the oldest removed vertex slot if there is one
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexDescriptor {
        self.vertices.insert_oldest(VertexData {
            position,
            halfedges: Vec::new(),
        })
    }

    pub fn add_vertex_xyz(&mut self, x: f64, y: f64, z: f64) -> VertexDescriptor {
        self.add_vertex(Point3::new(x, y, z))
    }

    /// Connect `v0` and `v1` with a new edge.
    /// Returns the half-edge whose target is `v1`; both half-edges start as borders.
    pub fn add_edge(
        &mut self,
        v0: VertexDescriptor,
        v1: VertexDescriptor,
    ) -> Result<HalfedgeDescriptor> {
        self.vertices.check(v0)?;
        self.vertices.check(v1)?;
        if v0 == v1 {
            return Err(KernelError::DegenerateEdge { vertex: v0.index() });
        }
        Ok(self.insert_edge(v0, v1))
    }

    /// Add a polygon over already existing, pairwise distinct vertices.
    ///
    /// Edges already connecting consecutive vertices are reused; their half-edge
    /// in the face's direction must still be a border. The mesh is left
    /// untouched when any precondition fails.
    pub fn add_face(&mut self, vertices: &[VertexDescriptor]) -> Result<FaceDescriptor> {
        let n = vertices.len();
        if n < 3 {
            return Err(KernelError::TooFewFaceVertices { count: n });
        }
        for (i, &v) in vertices.iter().enumerate() {
            self.vertices.check(v)?;
            if vertices[..i].contains(&v) {
                return Err(KernelError::DuplicateFaceVertex { vertex: v.index() });
            }
        }

        let mut existing = Vec::with_capacity(n);
        for i in 0..n {
            let (v0, v1) = (vertices[i], vertices[(i + 1) % n]);
            let h = self.find_connecting_halfedge(v0, v1);
            if let Some(h) = h {
                let bound = self.halfedges.get(h).face;
                if !bound.is_null() {
                    return Err(KernelError::HalfedgeAlreadyBound {
                        halfedge: h.index(),
                        source_vertex: v0.index(),
                        target_vertex: v1.index(),
                        face: bound.index(),
                    });
                }
            }
            existing.push(h);
        }

        let f = self.faces.insert_oldest(FaceData::default());
        let mut boundary = Vec::with_capacity(n);
        for (i, found) in existing.into_iter().enumerate() {
            let h = match found {
                Some(h) => h,
                None => self.insert_edge(vertices[i], vertices[(i + 1) % n]),
            };
            self.halfedges.get_mut(h).face = f;
            boundary.push(h);
        }

        for i in 0..n {
            self.set_next(boundary[i], boundary[(i + 1) % n]);
        }
        self.faces.get_mut(f).halfedges = boundary;

        Ok(f)
    }

    // Removal
    // -------

    /// Remove a face. Its half-edges become borders with no next/prev links.
    pub fn remove_face(&mut self, f: FaceDescriptor) -> Result<()> {
        self.faces.check(f)?;
        let boundary = std::mem::take(&mut self.faces.get_mut(f).halfedges);
        for h in boundary {
            let data = self.halfedges.get_mut(h);
            data.face = FaceDescriptor::null();
            data.next = HalfedgeDescriptor::null();
            data.prev = HalfedgeDescriptor::null();
        }
        self.faces.release(f);
        Ok(())
    }

    /// Remove an edge and both of its half-edges. Neither half-edge may belong to a face.
    pub fn remove_edge(&mut self, e: EdgeDescriptor) -> Result<()> {
        self.edges.check(e)?;
        let h0 = self.edges.get(e).halfedge;
        let h1 = self.halfedges.get(h0).opposite;
        if !self.is_border_halfedge(h0) || !self.is_border_halfedge(h1) {
            return Err(KernelError::EdgeInUse { edge: e.index() });
        }

        for h in [h0, h1] {
            let target = self.halfedges.get(h).target;
            self.vertices
                .get_mut(target)
                .halfedges
                .retain(|&incident| incident != h);
        }

        self.halfedges.release(h0);
        self.halfedges.release(h1);
        self.edges.release(e);
        Ok(())
    }

    /// Remove an isolated vertex
    pub fn remove_vertex(&mut self, v: VertexDescriptor) -> Result<()> {
        self.vertices.check(v)?;
        let incident = self.vertices.get(v).halfedges.len();
        if incident > 0 {
            return Err(KernelError::VertexInUse {
                vertex: v.index(),
                incident,
            });
        }
        self.vertices.release(v);
        Ok(())
    }

    // Navigation
    //
    // All lookups are O(1) and expect a live, non-null descriptor.
    // ----------

    /// Position of a vertex
    ///
    /// # Panics
    /// Panics if `v` was never allocated.
    pub fn position(&self, v: VertexDescriptor) -> &Point3<f64> {
        &self.vertices.get(v).position
    }

    pub fn set_position(&mut self, v: VertexDescriptor, position: Point3<f64>) {
        self.vertices.get_mut(v).position = position;
    }

    pub fn source(&self, h: HalfedgeDescriptor) -> VertexDescriptor {
        let opposite = self.halfedges.get(h).opposite;
        self.halfedges.get(opposite).target
    }

    pub fn target(&self, h: HalfedgeDescriptor) -> VertexDescriptor {
        self.halfedges.get(h).target
    }

    pub fn opposite(&self, h: HalfedgeDescriptor) -> HalfedgeDescriptor {
        self.halfedges.get(h).opposite
    }

    pub fn next(&self, h: HalfedgeDescriptor) -> HalfedgeDescriptor {
        self.halfedges.get(h).next
    }

    pub fn prev(&self, h: HalfedgeDescriptor) -> HalfedgeDescriptor {
        self.halfedges.get(h).prev
    }

    pub fn edge(&self, h: HalfedgeDescriptor) -> EdgeDescriptor {
        self.halfedges.get(h).edge
    }

    pub fn face(&self, h: HalfedgeDescriptor) -> FaceDescriptor {
        self.halfedges.get(h).face
    }

    /// Half-edge `i` of an edge: 0 is the primary half-edge, 1 its opposite
    ///
    /// # Panics
    /// Panics if `i` is not 0 or 1.
    pub fn edge_halfedge(&self, e: EdgeDescriptor, i: usize) -> HalfedgeDescriptor {
        let h = self.edges.get(e).halfedge;
        match i {
            0 => h,
            1 => self.opposite(h),
            _ => panic!("edge end index must be 0 or 1, got {}", i),
        }
    }

    /// Vertex `i` of an edge: the target of `edge_halfedge(e, i)`
    ///
    /// # Panics
    /// Panics if `i` is not 0 or 1.
    pub fn edge_vertex(&self, e: EdgeDescriptor, i: usize) -> VertexDescriptor {
        self.target(self.edge_halfedge(e, i))
    }

    /// Find the half-edge running from `s` to `t`.
    ///
    /// The incident edge sets of both vertices are intersected. A match found in
    /// the reverse direction is swapped for its opposite when that opposite lies
    /// on a face, or unconditionally with `strict_check`. Returns null when the
    /// vertices are not connected.
    pub fn halfedge_between(
        &self,
        s: VertexDescriptor,
        t: VertexDescriptor,
        strict_check: bool,
    ) -> HalfedgeDescriptor {
        let t_edges: Vec<EdgeDescriptor> = self
            .get_halfedges_around_vertex(t)
            .iter()
            .map(|&h| self.edge(h))
            .collect();

        let mut result = HalfedgeDescriptor::null();
        for &h in self.get_halfedges_around_vertex(s) {
            if !t_edges.contains(&self.edge(h)) {
                continue;
            }
            result = h;
            if self.source(h) == s && self.target(h) == t {
                continue;
            }
            let opposite = self.opposite(h);
            if !self.face(opposite).is_null() || strict_check {
                result = opposite;
                break;
            }
        }
        result
    }

    /// Edge connecting `s` and `t`, or null
    pub fn edge_between(
        &self,
        s: VertexDescriptor,
        t: VertexDescriptor,
        strict_check: bool,
    ) -> EdgeDescriptor {
        let h = self.halfedge_between(s, t, strict_check);
        if h.is_null() {
            EdgeDescriptor::null()
        } else {
            self.edge(h)
        }
    }

    /// A half-edge is a border when it belongs to no face
    pub fn is_border_halfedge(&self, h: HalfedgeDescriptor) -> bool {
        self.face(h).is_null()
    }

    /// An edge is a border when either of its half-edges is
    pub fn is_border_edge(&self, e: EdgeDescriptor) -> bool {
        self.is_border_halfedge(self.edge_halfedge(e, 0))
            || self.is_border_halfedge(self.edge_halfedge(e, 1))
    }

    // Adjacency
    // ---------

    pub fn get_halfedges_around_face(&self, f: FaceDescriptor) -> &[HalfedgeDescriptor] {
        &self.faces.get(f).halfedges
    }

    /// Targets of the boundary half-edges, in traversal order
    pub fn get_vertices_around_face(&self, f: FaceDescriptor) -> Vec<VertexDescriptor> {
        self.get_halfedges_around_face(f)
            .iter()
            .map(|&h| self.target(h))
            .collect()
    }

    /// Faces sharing an edge with `f`; border neighbours are skipped
    pub fn get_faces_around_face(&self, f: FaceDescriptor) -> Vec<FaceDescriptor> {
        self.get_halfedges_around_face(f)
            .iter()
            .map(|&h| self.opposite(h))
            .filter(|o| !o.is_null())
            .map(|o| self.face(o))
            .filter(|nf| !nf.is_null())
            .collect()
    }

    /// Incoming half-edges of `v`
    pub fn get_halfedges_around_vertex(&self, v: VertexDescriptor) -> &[HalfedgeDescriptor] {
        &self.vertices.get(v).halfedges
    }

    /// Number of boundary half-edges of a face
    pub fn degree(&self, f: FaceDescriptor) -> usize {
        self.faces.get(f).halfedges.len()
    }

    /// Number of edges incident to a vertex
    pub fn valence(&self, v: VertexDescriptor) -> usize {
        self.vertices.get(v).halfedges.len()
    }

    pub fn face_bounding_box(&self, f: FaceDescriptor) -> BoundingBox {
        BoundingBox::from_points(
            self.get_halfedges_around_face(f)
                .iter()
                .map(|&h| self.position(self.target(h))),
        )
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices().map(|v| self.position(v)))
    }

    /// Check the connectivity invariants, reporting the first violation
    pub fn validate(&self) -> Result<()> {
        for h in self.halfedges() {
            let data = self.halfedges.get(h);
            let o = data.opposite;
            if !self.halfedges.is_live(o) || o == h || self.opposite(o) != h {
                return Err(KernelError::InvariantViolation(format!(
                    "opposite of {} is not an involution",
                    h
                )));
            }
            if self.edge(o) != data.edge {
                return Err(KernelError::InvariantViolation(format!(
                    "{} and {} disagree on their edge",
                    h, o
                )));
            }
            if !data.next.is_null() && self.prev(data.next) != h {
                return Err(KernelError::InvariantViolation(format!(
                    "prev(next({})) != {}",
                    h, h
                )));
            }
            if !self.get_halfedges_around_vertex(data.target).contains(&h) {
                return Err(KernelError::InvariantViolation(format!(
                    "{} missing from incidence list of {}",
                    h, data.target
                )));
            }
        }

        for f in self.faces() {
            let boundary = self.get_halfedges_around_face(f);
            let Some(&start) = boundary.first() else {
                return Err(KernelError::InvariantViolation(format!("{} is empty", f)));
            };
            let mut h = start;
            for _ in 0..boundary.len() {
                if self.face(h) != f {
                    return Err(KernelError::InvariantViolation(format!(
                        "{} on the cycle of {} reports {}",
                        h,
                        f,
                        self.face(h)
                    )));
                }
                h = self.next(h);
            }
            if h != start {
                return Err(KernelError::InvariantViolation(format!(
                    "cycle of {} does not close after {} steps",
                    f,
                    boundary.len()
                )));
            }
        }
        Ok(())
    }

    // Internals
    // ---------

    fn insert_edge(&mut self, v0: VertexDescriptor, v1: VertexDescriptor) -> HalfedgeDescriptor {
        // primary takes the oldest free slot, its opposite the most recent one
        let h0 = self.halfedges.insert_oldest(HalfedgeData::unlinked(v1));
        let h1 = self.halfedges.insert_newest(HalfedgeData::unlinked(v0));
        let e = self.edges.insert_oldest(EdgeData { halfedge: h0 });

        {
            let d0 = self.halfedges.get_mut(h0);
            d0.opposite = h1;
            d0.edge = e;
        }
        {
            let d1 = self.halfedges.get_mut(h1);
            d1.opposite = h0;
            d1.edge = e;
        }

        Self::register_incidence(&mut self.vertices.get_mut(v0).halfedges, h1);
        Self::register_incidence(&mut self.vertices.get_mut(v1).halfedges, h0);
        h0
    }

    fn register_incidence(halfedges: &mut Vec<HalfedgeDescriptor>, h: HalfedgeDescriptor) {
        if !halfedges.contains(&h) {
            halfedges.push(h);
        }
    }

    /// Half-edge targeting `v1` on an edge shared by `v0` and `v1`
    fn find_connecting_halfedge(
        &self,
        v0: VertexDescriptor,
        v1: VertexDescriptor,
    ) -> Option<HalfedgeDescriptor> {
        let v1_halfedges = self.get_halfedges_around_vertex(v1);
        self.get_halfedges_around_vertex(v0).iter().find_map(|&h0| {
            let e = self.edge(h0);
            v1_halfedges.iter().copied().find(|&h1| self.edge(h1) == e)
        })
    }

    fn set_next(&mut self, h: HalfedgeDescriptor, next: HalfedgeDescriptor) {
        self.halfedges.get_mut(h).next = next;
        self.halfedges.get_mut(next).prev = h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (HalfEdgeMesh, Vec<VertexDescriptor>) {
        let mut mesh = HalfEdgeMesh::new();
        let v = vec![
            mesh.add_vertex_xyz(0.0, 0.0, 0.0),
            mesh.add_vertex_xyz(1.0, 0.0, 0.0),
            mesh.add_vertex_xyz(1.0, 1.0, 0.0),
            mesh.add_vertex_xyz(0.0, 1.0, 0.0),
        ];
        (mesh, v)
    }

    #[test]
    fn test_add_edge() {
        let (mut mesh, v) = quad();
        let h = mesh.add_edge(v[0], v[1]).unwrap();

        assert_eq!(mesh.target(h), v[1]);
        assert_eq!(mesh.source(h), v[0]);
        assert_eq!(mesh.opposite(mesh.opposite(h)), h);
        assert!(mesh.is_border_halfedge(h));
        assert!(mesh.is_border_edge(mesh.edge(h)));
        assert_eq!(mesh.number_of_edges(), 1);
        assert_eq!(mesh.number_of_halfedges(), 2);
        assert_eq!(mesh.get_halfedges_around_vertex(v[1]), &[h]);
    }

    #[test]
    fn test_add_edge_rejects_degenerate() {
        let (mut mesh, v) = quad();
        assert!(matches!(
            mesh.add_edge(v[2], v[2]),
            Err(KernelError::DegenerateEdge { vertex: 2 })
        ));
        assert!(mesh.add_edge(v[0], VertexDescriptor::null()).is_err());
    }

    #[test]
    fn test_add_quad_face() {
        let (mut mesh, v) = quad();
        let f = mesh.add_face(&v).unwrap();

        assert_eq!(mesh.degree(f), 4);
        assert_eq!(mesh.get_vertices_around_face(f), vec![v[1], v[2], v[3], v[0]]);
        assert_eq!(mesh.number_of_edges(), 4);
        assert!(mesh.get_faces_around_face(f).is_empty());
        mesh.validate().unwrap();
    }

    #[test]
    fn test_face_reuses_existing_edge() {
        let (mut mesh, v) = quad();
        let f0 = mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let f1 = mesh.add_face(&[v[0], v[2], v[3]]).unwrap();

        assert_eq!(mesh.number_of_edges(), 5);
        assert_eq!(mesh.get_faces_around_face(f0), vec![f1]);
        assert_eq!(mesh.get_faces_around_face(f1), vec![f0]);

        let diagonal = mesh.edge_between(v[0], v[2], true);
        assert!(!mesh.is_border_edge(diagonal));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_add_face_rejects_bound_halfedge() {
        let (mut mesh, v) = quad();
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let before = (mesh.number_of_faces(), mesh.number_of_edges());

        let err = mesh.add_face(&[v[0], v[1], v[3]]).unwrap_err();
        assert!(matches!(err, KernelError::HalfedgeAlreadyBound { .. }));
        assert_eq!((mesh.number_of_faces(), mesh.number_of_edges()), before);
    }

    #[test]
    fn test_add_face_preconditions() {
        let (mut mesh, v) = quad();
        assert!(matches!(
            mesh.add_face(&v[..2]),
            Err(KernelError::TooFewFaceVertices { count: 2 })
        ));
        assert!(matches!(
            mesh.add_face(&[v[0], v[1], v[0]]),
            Err(KernelError::DuplicateFaceVertex { .. })
        ));
        assert!(matches!(
            mesh.add_face(&[v[0], v[1], VertexDescriptor::new(40)]),
            Err(KernelError::RemovedDescriptor { .. })
        ));
        assert_eq!(mesh.number_of_faces(), 0);
        assert_eq!(mesh.number_of_halfedges(), 0);
    }

    #[test]
    fn test_halfedge_between_prefers_face_side() {
        let (mut mesh, v) = quad();
        mesh.add_face(&[v[0], v[1], v[2]]).unwrap();

        // v1 -> v0 is a border: the non-strict lookup falls back to the face side
        let loose = mesh.halfedge_between(v[1], v[0], false);
        assert_eq!(mesh.source(loose), v[0]);
        assert_eq!(mesh.target(loose), v[1]);

        let strict = mesh.halfedge_between(v[1], v[0], true);
        assert_eq!(mesh.source(strict), v[1]);
        assert_eq!(mesh.target(strict), v[0]);

        assert!(mesh.halfedge_between(v[1], v[3], true).is_null());
    }

    #[test]
    fn test_remove_face_and_edge_reuse() {
        let (mut mesh, v) = quad();
        let f = mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let e = mesh.edge_between(v[0], v[1], true);

        assert!(matches!(mesh.remove_edge(e), Err(KernelError::EdgeInUse { .. })));
        mesh.remove_face(f).unwrap();
        assert!(mesh.is_removed_face(f));
        assert_eq!(mesh.number_of_faces(), 0);
        assert_eq!(mesh.faces().count(), 0);

        let h0 = mesh.edge_halfedge(e, 0);
        let h1 = mesh.edge_halfedge(e, 1);
        mesh.remove_edge(e).unwrap();
        assert_eq!(mesh.number_of_edges(), 2);
        assert_eq!(mesh.number_of_halfedges(), 4);
        assert_eq!(mesh.valence(v[0]), 1);

        let h = mesh.add_edge(v[3], v[0]).unwrap();
        assert_eq!(h, h0);
        assert_eq!(mesh.opposite(h), h1);
        assert_eq!(mesh.edge(h), e);

        let f2 = mesh.add_face(&[v[0], v[2], v[3]]).unwrap();
        assert_eq!(f2, f);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_from_polygons_rejects_unknown_index() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let err = HalfEdgeMesh::from_polygons(&positions, &[vec![0, 1, 2], vec![0, 1, 5]])
            .unwrap_err();
        assert!(matches!(
            err,
            KernelError::PolygonIndexOutOfRange {
                polygon: 1,
                index: 5,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_faces_reused_oldest_first() {
        let (mut mesh, v) = quad();
        let a = mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let b = mesh.add_face(&[v[0], v[2], v[3]]).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));

        mesh.remove_face(b).unwrap();
        mesh.remove_face(a).unwrap();
        assert_eq!(mesh.add_face(&[v[0], v[1], v[2]]).unwrap(), b);
        assert_eq!(mesh.add_face(&[v[0], v[2], v[3]]).unwrap(), a);
        mesh.validate().unwrap();
    }

    #[test]
    fn test_remove_vertex() {
        let (mut mesh, v) = quad();
        mesh.add_edge(v[0], v[1]).unwrap();
        assert!(matches!(
            mesh.remove_vertex(v[0]),
            Err(KernelError::VertexInUse { incident: 1, .. })
        ));
        mesh.remove_vertex(v[3]).unwrap();
        mesh.remove_vertex(v[2]).unwrap();
        assert_eq!(mesh.number_of_vertices(), 2);
        assert_eq!(mesh.vertices().collect::<Vec<_>>(), vec![v[0], v[1]]);

        assert_eq!(mesh.add_vertex_xyz(5.0, 5.0, 5.0), v[3]);
        assert_eq!(mesh.add_vertex_xyz(6.0, 6.0, 6.0), v[2]);
        assert_eq!(mesh.position(v[3]), &Point3::new(5.0, 5.0, 5.0));
        assert_eq!(mesh.valence(v[3]), 0);
    }

    #[test]
    fn test_face_bounding_box() {
        let (mut mesh, v) = quad();
        let f = mesh.add_face(&[v[0], v[1], v[2]]).unwrap();
        let bbox = mesh.face_bounding_box(f);
        assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bbox.max, Point3::new(1.0, 1.0, 0.0));
    }
}
