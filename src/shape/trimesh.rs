use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real};
use crate::partitioning::HierarchyTree;
use crate::shape::{Shape, ShapeClass, ShapeType};

/// The bounding-volume kind a [`TriMesh`] hierarchy was built for.
///
/// All kinds share the same axis-aligned internal tree; the tag selects which
/// mesh-vs-mesh continuous-collision specialization applies to a pair of meshes.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshBvKind {
    /// Axis-aligned boxes.
    Aabb,
    /// Oriented boxes.
    Obb,
    /// Rectangle-swept spheres.
    Rss,
    /// Intersections of spheres.
    Kios,
    /// Paired oriented boxes and rectangle-swept spheres.
    ObbRss,
    /// Discrete-orientation polytopes with 16 directions.
    Kdop16,
    /// Discrete-orientation polytopes with 18 directions.
    Kdop18,
    /// Discrete-orientation polytopes with 24 directions.
    Kdop24,
}

impl MeshBvKind {
    pub(crate) fn shape_type(self) -> ShapeType {
        match self {
            MeshBvKind::Aabb => ShapeType::TriMeshAabb,
            MeshBvKind::Obb => ShapeType::TriMeshObb,
            MeshBvKind::Rss => ShapeType::TriMeshRss,
            MeshBvKind::Kios => ShapeType::TriMeshKios,
            MeshBvKind::ObbRss => ShapeType::TriMeshObbRss,
            MeshBvKind::Kdop16 => ShapeType::TriMeshKdop16,
            MeshBvKind::Kdop18 => ShapeType::TriMeshKdop18,
            MeshBvKind::Kdop24 => ShapeType::TriMeshKdop24,
        }
    }
}

/// A triangle mesh backed by a bounding-volume hierarchy over its triangles.
///
/// The mesh supports an explicit vertex-update protocol:
/// [`TriMesh::begin_update`], [`TriMesh::update_vertices`], [`TriMesh::end_update`].
/// After `end_update`, the previous vertex buffer is retained and every tree leaf
/// covers the triangle's positions in both buffers, which is what mesh-continuous
/// traversals consume.
#[derive(Clone)]
pub struct TriMesh {
    bv_kind: MeshBvKind,
    vertices: Vec<Point<Real>>,
    prev_vertices: Option<Vec<Point<Real>>>,
    indices: Vec<[u32; 3]>,
    tree: HierarchyTree<u32>,
    staged: Option<Vec<Point<Real>>>,
}

impl TriMesh {
    /// Creates a mesh from a vertex buffer and a triangle index buffer.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>, bv_kind: MeshBvKind) -> Self {
        let mut result = Self {
            bv_kind,
            vertices,
            prev_vertices: None,
            indices,
            tree: HierarchyTree::new(),
            staged: None,
        };
        result.rebuild_tree();
        result
    }

    /// The bounding-volume kind of this mesh.
    #[inline]
    pub fn bv_kind(&self) -> MeshBvKind {
        self.bv_kind
    }

    /// The vertex buffer of this mesh.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The vertex buffer this mesh held before the last completed update, if any.
    #[inline]
    pub fn prev_vertices(&self) -> Option<&[Point<Real>]> {
        self.prev_vertices.as_deref()
    }

    /// The triangle index buffer of this mesh.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The number of triangles of this mesh.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// The vertices of the `i`-th triangle, read from the current vertex buffer.
    #[inline]
    pub fn triangle(&self, i: u32) -> [Point<Real>; 3] {
        let idx = self.indices[i as usize];
        [
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        ]
    }

    /// The vertices of the `i`-th triangle read from the previous vertex buffer, falling
    /// back to the current one if no update happened.
    #[inline]
    pub fn prev_triangle(&self, i: u32) -> [Point<Real>; 3] {
        let verts = self.prev_vertices.as_deref().unwrap_or(&self.vertices);
        let idx = self.indices[i as usize];
        [
            verts[idx[0] as usize],
            verts[idx[1] as usize],
            verts[idx[2] as usize],
        ]
    }

    /// The internal hierarchy of this mesh.
    #[inline]
    pub fn tree(&self) -> &HierarchyTree<u32> {
        &self.tree
    }

    /// Starts a vertex update.
    pub fn begin_update(&mut self) {
        self.staged = Some(self.vertices.clone());
    }

    /// Replaces the staged vertex buffer.
    ///
    /// Must be called between [`TriMesh::begin_update`] and [`TriMesh::end_update`].
    /// `vertices` must have the same length as the current vertex buffer.
    pub fn update_vertices(&mut self, vertices: Vec<Point<Real>>) {
        assert_eq!(vertices.len(), self.vertices.len());
        self.staged = Some(vertices);
    }

    /// Commits a vertex update: the staged buffer becomes current, the former buffer is
    /// retained as the previous one, and the hierarchy is refit over both.
    pub fn end_update(&mut self) {
        if let Some(staged) = self.staged.take() {
            let prev = core::mem::replace(&mut self.vertices, staged);
            self.prev_vertices = Some(prev);
            self.rebuild_tree();
        }
    }

    fn triangle_bv(&self, i: u32) -> Aabb {
        let mut bv = Aabb::from_points(self.triangle(i).iter());
        if self.prev_vertices.is_some() {
            bv.merge(&Aabb::from_points(self.prev_triangle(i).iter()));
        }
        bv
    }

    fn rebuild_tree(&mut self) {
        let bvs: Vec<Aabb> = (0..self.indices.len() as u32)
            .map(|i| self.triangle_bv(i))
            .collect();
        self.tree.clear();
        let leaves = bvs
            .into_iter()
            .enumerate()
            .map(|(i, bv)| self.tree.new_leaf(bv, i as u32))
            .collect();
        self.tree.init(leaves, 0);
    }
}

impl Shape for TriMesh {
    fn compute_local_aabb(&self) -> Aabb {
        if self.tree.is_empty() {
            Aabb::new_invalid()
        } else {
            self.tree.node(self.tree.root()).bv
        }
    }

    fn shape_type(&self) -> ShapeType {
        self.bv_kind.shape_type()
    }

    fn shape_class(&self) -> ShapeClass {
        ShapeClass::Mesh
    }

    fn angular_motion_disc(&self) -> Real {
        self.vertices
            .iter()
            .fold(0.0, |max, pt| max.max(pt.coords.norm()))
    }
}
