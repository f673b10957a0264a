use crate::bounding_volume::BoundingVolume;
use crate::math::{Isometry, Point, Real, Vector};
use crate::motion::{RigidMotion, TranslationMotion};
use crate::partitioning::NodeIndex;
use crate::query::{ContinuousCollisionRequest, ContinuousCollisionResult};
use crate::shape::{Shape, TriMesh};

// Tolerance used by the feature-pair containment checks.
const CONTACT_EPS: Real = 1.0e-6;

/// The outcome of a mesh-vs-mesh continuous traversal.
pub struct MeshContinuousResult {
    /// The triangle pairs for which a contact was found during the unit time interval.
    pub pairs: Vec<(u32, u32)>,
    /// The earliest contact time found, or `1.0` when no contact happened.
    pub time_of_contact: Real,
}

pub(crate) fn continuous_collide_mesh_polynomial(
    g1: &dyn Shape,
    motion1: &TranslationMotion,
    g2: &dyn Shape,
    motion2: &TranslationMotion,
    _request: &ContinuousCollisionRequest,
    result: &mut ContinuousCollisionResult,
) -> Real {
    let (Some(mesh1), Some(mesh2)) = (
        g1.downcast_ref::<TriMesh>(),
        g2.downcast_ref::<TriMesh>(),
    ) else {
        log::warn!("polynomial continuous collision requires two triangle meshes");
        result.is_collide = false;
        return -1.0;
    };

    if mesh1.bv_kind() != mesh2.bv_kind() {
        log::warn!(
            "bounding-volume kinds {:?} and {:?} are not supported by the polynomial solver",
            mesh1.bv_kind(),
            mesh2.bv_kind()
        );
        result.is_collide = false;
        return -1.0;
    }

    // Ephemeral swept copies: the previous buffer holds the `t = 0` positions, the current
    // buffer the `t = 1` positions. The source meshes stay untouched on every path.
    let swept1 = swept_copy(mesh1, &motion1.velocity());
    let swept2 = swept_copy(mesh2, &motion2.velocity());

    let tf1 = motion1.position_at_time(0.0);
    let tf2 = motion2.position_at_time(0.0);

    let traversal = mesh_mesh_toc(&swept1, &tf1, &swept2, &tf2);

    result.is_collide = !traversal.pairs.is_empty();
    result.time_of_contact = traversal.time_of_contact;

    if result.is_collide {
        result.contact_tf1 = motion1.position_at_time(result.time_of_contact);
        result.contact_tf2 = motion2.position_at_time(result.time_of_contact);
    }

    result.time_of_contact
}

fn swept_copy(mesh: &TriMesh, velocity: &Vector<Real>) -> TriMesh {
    let mut copy = mesh.clone();
    let shifted = copy.vertices().iter().map(|pt| pt + velocity).collect();
    copy.begin_update();
    copy.update_vertices(shifted);
    copy.end_update();
    copy
}

/// Continuous traversal of two meshes whose previous/current vertex buffers hold their
/// `t = 0` and `t = 1` positions.
///
/// Both transforms are the world positions at `t = 0`; the motion itself is encoded in the
/// vertex buffers. Tree bounds cover each triangle's whole swept volume, so pruning on
/// their overlap is conservative.
pub fn mesh_mesh_toc(
    mesh1: &TriMesh,
    tf1: &Isometry<Real>,
    mesh2: &TriMesh,
    tf2: &Isometry<Real>,
) -> MeshContinuousResult {
    let mut result = MeshContinuousResult {
        pairs: Vec::new(),
        time_of_contact: 1.0,
    };

    if mesh1.tree().is_empty() || mesh2.tree().is_empty() {
        return result;
    }

    collide_rec(
        mesh1,
        tf1,
        mesh1.tree().root(),
        mesh2,
        tf2,
        mesh2.tree().root(),
        &mut result,
    );
    result
}

fn collide_rec(
    mesh1: &TriMesh,
    tf1: &Isometry<Real>,
    n1: NodeIndex,
    mesh2: &TriMesh,
    tf2: &Isometry<Real>,
    n2: NodeIndex,
    result: &mut MeshContinuousResult,
) {
    let node1 = mesh1.tree().node(n1);
    let node2 = mesh2.tree().node(n2);
    let bv1 = node1.bv.transform_by(tf1);
    let bv2 = node2.bv.transform_by(tf2);

    if !bv1.intersects(&bv2) {
        return;
    }

    if node1.is_leaf() && node2.is_leaf() {
        leaf_pair_toc(mesh1, tf1, node1.data, mesh2, tf2, node2.data, result);
        return;
    }

    if node2.is_leaf() || (!node1.is_leaf() && bv1.size() > bv2.size()) {
        for child in node1.children {
            collide_rec(mesh1, tf1, child, mesh2, tf2, n2, result);
        }
    } else {
        for child in node2.children {
            collide_rec(mesh1, tf1, n1, mesh2, tf2, child, result);
        }
    }
}

fn leaf_pair_toc(
    mesh1: &TriMesh,
    tf1: &Isometry<Real>,
    tri1: u32,
    mesh2: &TriMesh,
    tf2: &Isometry<Real>,
    tri2: u32,
    result: &mut MeshContinuousResult,
) {
    let a0 = mesh1.prev_triangle(tri1).map(|p| tf1 * p);
    let a1 = mesh1.triangle(tri1).map(|p| tf1 * p);
    let b0 = mesh2.prev_triangle(tri2).map(|p| tf2 * p);
    let b1 = mesh2.triangle(tri2).map(|p| tf2 * p);

    // Both meshes translate uniformly, so the relative motion is a single constant
    // velocity: keep the first triangle static and move the second by `w`.
    let va = a1[0] - a0[0];
    let vb = b1[0] - b0[0];
    let w = vb - va;

    if let Some(toc) = triangle_triangle_first_contact(&a0, &b0, &w) {
        result.pairs.push((tri1, tri2));
        if toc < result.time_of_contact {
            result.time_of_contact = toc;
        }
    }
}

// First time in [0, 1] at which a static triangle `a` and a triangle `b` translating with
// constant velocity `w` come in contact. For translating triangles the face normals and
// edge directions are constant, so every vertex-face and edge-edge contact condition is
// linear in time.
fn triangle_triangle_first_contact(
    a: &[Point<Real>; 3],
    b: &[Point<Real>; 3],
    w: &Vector<Real>,
) -> Option<Real> {
    let mut best: Option<Real> = None;
    let mut consider = |t: Real| {
        if best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };

    // Vertices of `b` against the face of `a`.
    let normal_a = (a[1] - a[0]).cross(&(a[2] - a[0]));
    if normal_a.norm_squared() > CONTACT_EPS * CONTACT_EPS {
        let denom = normal_a.dot(w);
        if denom.abs() > CONTACT_EPS {
            for p in b {
                let t = normal_a.dot(&(a[0] - p)) / denom;
                if (-CONTACT_EPS..=1.0 + CONTACT_EPS).contains(&t) {
                    let hit = p + w * t;
                    if point_in_triangle(&hit, a, &normal_a) {
                        consider(t.clamp(0.0, 1.0));
                    }
                }
            }
        }
    }

    // Vertices of `a` against the (moving) face of `b`.
    let normal_b = (b[1] - b[0]).cross(&(b[2] - b[0]));
    if normal_b.norm_squared() > CONTACT_EPS * CONTACT_EPS {
        let denom = normal_b.dot(w);
        if denom.abs() > CONTACT_EPS {
            for p in a {
                let t = normal_b.dot(&(p - b[0])) / denom;
                if (-CONTACT_EPS..=1.0 + CONTACT_EPS).contains(&t) {
                    let shift = w * t;
                    let moved = [b[0] + shift, b[1] + shift, b[2] + shift];
                    if point_in_triangle(p, &moved, &normal_b) {
                        consider(t.clamp(0.0, 1.0));
                    }
                }
            }
        }
    }

    // Edge-edge crossings.
    const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];
    for (i, j) in EDGES {
        let u = a[j] - a[i];
        for (k, l) in EDGES {
            let v = b[l] - b[k];
            let n = u.cross(&v);
            if n.norm_squared() <= CONTACT_EPS * CONTACT_EPS {
                continue;
            }
            let denom = n.dot(w);
            if denom.abs() <= CONTACT_EPS {
                continue;
            }

            let t = n.dot(&(a[i] - b[k])) / denom;
            if !(-CONTACT_EPS..=1.0 + CONTACT_EPS).contains(&t) {
                continue;
            }

            // The edges are coplanar at time `t`; check they actually cross.
            let bk = b[k] + w * t;
            if segments_cross(&a[i], &u, &bk, &v) {
                consider(t.clamp(0.0, 1.0));
            }
        }
    }

    best
}

fn point_in_triangle(p: &Point<Real>, tri: &[Point<Real>; 3], normal: &Vector<Real>) -> bool {
    let scale = normal.norm();
    for i in 0..3 {
        let edge = tri[(i + 1) % 3] - tri[i];
        if edge.cross(&(p - tri[i])).dot(normal) < -CONTACT_EPS * scale {
            return false;
        }
    }
    true
}

// Do the coplanar segments `p + s u` and `q + r v` (`s, r ∈ [0, 1]`) intersect?
fn segments_cross(
    p: &Point<Real>,
    u: &Vector<Real>,
    q: &Point<Real>,
    v: &Vector<Real>,
) -> bool {
    let d = q - p;
    let uu = u.norm_squared();
    let vv = v.norm_squared();
    let uv = u.dot(v);
    let denom = uu * vv - uv * uv;
    if denom.abs() <= CONTACT_EPS {
        return false;
    }

    let du = d.dot(u);
    let dv = d.dot(v);
    let s = (du * vv - dv * uv) / denom;
    let r = (du * uv - dv * uu) / denom;

    if !(-CONTACT_EPS..=1.0 + CONTACT_EPS).contains(&s)
        || !(-CONTACT_EPS..=1.0 + CONTACT_EPS).contains(&r)
    {
        return false;
    }

    let closest1 = p + u * s;
    let closest2 = q + v * r;
    (closest2 - closest1).norm_squared() <= CONTACT_EPS
}
