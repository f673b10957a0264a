//! The Gilbert-Johnson-Keerthi distance algorithm.

use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::SupportMap;
use na::Unit;

/// The absolute tolerance used by the GJK algorithm.
pub fn eps_tol() -> Real {
    DEFAULT_EPSILON * 10.0
}

/// A point of the configuration-space obstacle (Minkowski difference) of two shapes.
///
/// All coordinates are expressed in the local-space of the first shape.
#[derive(Copy, Clone, Debug)]
pub struct CsoPoint {
    /// The point on the Minkowski difference: `orig1 - orig2`.
    pub point: Point<Real>,
    /// The support point of the first shape.
    pub orig1: Point<Real>,
    /// The support point of the second shape.
    pub orig2: Point<Real>,
}

impl CsoPoint {
    /// The support point of the Minkowski difference of `g1` and `g2` toward `dir`.
    pub fn from_shapes(
        pos12: &Isometry<Real>,
        g1: &dyn SupportMap,
        g2: &dyn SupportMap,
        dir: &Vector<Real>,
    ) -> Self {
        let orig1 = g1.local_support_point(dir);
        let orig2 = g2.support_point(pos12, &-dir);
        CsoPoint {
            point: Point::from(orig1 - orig2),
            orig1,
            orig2,
        }
    }
}

/// Results of the GJK algorithm.
///
/// All points and vectors are expressed in the local-space of the first shape.
#[derive(Clone, Debug, PartialEq)]
pub enum GjkResult {
    /// The shapes are intersecting.
    Intersection,
    /// The shapes are separated; closest points and the unit direction from the first shape
    /// toward the second are provided.
    ClosestPoints(Point<Real>, Point<Real>, Unit<Vector<Real>>),
    /// The shapes are separated by a distance larger than the provided maximum.
    NoIntersection(Unit<Vector<Real>>),
}

// Barycentric description of the point of a simplex closest to the origin: pairs of
// (vertex index, weight), restricted to the vertices actually supporting the projection.
type SimplexProjection = (Vector<Real>, Vec<(usize, Real)>);

fn closest_segment(a: Point<Real>, b: Point<Real>) -> SimplexProjection {
    let ab = b - a;
    let denom = ab.norm_squared();
    if denom < eps_tol() {
        return (a.coords, vec![(0, 1.0)]);
    }

    let t = -a.coords.dot(&ab) / denom;
    if t <= 0.0 {
        (a.coords, vec![(0, 1.0)])
    } else if t >= 1.0 {
        (b.coords, vec![(1, 1.0)])
    } else {
        (a.coords + ab * t, vec![(0, 1.0 - t), (1, t)])
    }
}

// Closest point on a triangle to the origin, by Voronoi-region classification.
fn closest_triangle(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> SimplexProjection {
    let ab = b - a;
    let ac = c - a;
    let ap = -a.coords;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a.coords, vec![(0, 1.0)]);
    }

    let bp = -b.coords;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b.coords, vec![(1, 1.0)]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return (a.coords + ab * t, vec![(0, 1.0 - t), (1, t)]);
    }

    let cp = -c.coords;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c.coords, vec![(2, 1.0)]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return (a.coords + ac * t, vec![(0, 1.0 - t), (2, t)]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b.coords + (c - b) * t, vec![(1, 1.0 - t), (2, t)]);
    }

    let denom = va + vb + vc;
    if denom.abs() < eps_tol() {
        // Degenerate triangle: fall back to the best edge.
        let candidates = [
            remap(closest_segment(a, b), [0, 1]),
            remap(closest_segment(a, c), [0, 2]),
            remap(closest_segment(b, c), [1, 2]),
        ];
        return candidates
            .into_iter()
            .min_by(|(v1, _), (v2, _)| {
                v1.norm_squared()
                    .partial_cmp(&v2.norm_squared())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .unwrap();
    }

    let wb = vb / denom;
    let wc = vc / denom;
    (
        a.coords + ab * wb + ac * wc,
        vec![(0, 1.0 - wb - wc), (1, wb), (2, wc)],
    )
}

// Renames the vertex indices of a sub-simplex projection back to the parent simplex.
fn remap<const N: usize>(mut projection: SimplexProjection, indices: [usize; N]) -> SimplexProjection {
    for entry in &mut projection.1 {
        entry.0 = indices[entry.0];
    }
    projection
}

// Closest point on a tetrahedron to the origin. Returns `None` when the origin is inside.
fn closest_tetrahedron(pts: &[CsoPoint]) -> Option<SimplexProjection> {
    let [a, b, c, d] = [pts[0].point, pts[1].point, pts[2].point, pts[3].point];

    // Faces paired with the opposite vertex.
    let faces = [
        ([a, b, c], d, [0usize, 1, 2]),
        ([a, b, d], c, [0, 1, 3]),
        ([a, c, d], b, [0, 2, 3]),
        ([b, c, d], a, [1, 2, 3]),
    ];

    let mut inside = true;
    let mut best: Option<SimplexProjection> = None;

    for (tri, opposite, indices) in faces {
        let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
        let signp = (-tri[0].coords).dot(&n);
        let signd = (opposite - tri[0]).dot(&n);

        if signd.abs() < eps_tol() {
            // Degenerate tetrahedron: consider every face.
            inside = false;
        } else if signp * signd >= 0.0 {
            // Origin on the inner side of this face.
            continue;
        } else {
            inside = false;
        }

        let projection = remap(closest_triangle(tri[0], tri[1], tri[2]), indices);
        let closer = best
            .as_ref()
            .map_or(true, |(v, _)| projection.0.norm_squared() < v.norm_squared());
        if closer {
            best = Some(projection);
        }
    }

    if inside {
        None
    } else {
        best
    }
}

// Projects the origin on the simplex, reducing it to the vertices supporting the
// projection. Returns the projection coordinates and the barycentric weights aligned with
// the reduced simplex, or `None` when the origin lies inside the simplex.
fn project_origin(simplex: &mut Vec<CsoPoint>) -> Option<(Vector<Real>, Vec<Real>)> {
    let projection = match simplex.len() {
        1 => (simplex[0].point.coords, vec![(0, 1.0)]),
        2 => closest_segment(simplex[0].point, simplex[1].point),
        3 => closest_triangle(simplex[0].point, simplex[1].point, simplex[2].point),
        _ => closest_tetrahedron(simplex)?,
    };

    let (proj, weights) = projection;
    let reduced: Vec<CsoPoint> = weights.iter().map(|(i, _)| simplex[*i]).collect();
    *simplex = reduced;
    Some((proj, weights.into_iter().map(|(_, w)| w).collect()))
}

/// Computes the closest points between two support-mapped shapes.
///
/// `pos12` is the position of `g2` expressed in the local-space of `g1`. Returns
/// [`GjkResult::NoIntersection`] when the separation exceeds `max_dist`.
pub fn closest_points(
    pos12: &Isometry<Real>,
    g1: &dyn SupportMap,
    g2: &dyn SupportMap,
    max_dist: Real,
) -> GjkResult {
    let abs_tol = eps_tol();
    let rel_tol = abs_tol.sqrt();

    let mut dir = -pos12.translation.vector;
    if dir.norm_squared() < abs_tol {
        dir = Vector::x();
    }

    let mut simplex = vec![CsoPoint::from_shapes(pos12, g1, g2, &dir)];

    for _ in 0..100 {
        let Some((proj, weights)) = project_origin(&mut simplex) else {
            return GjkResult::Intersection;
        };

        let dist = proj.norm();
        if dist <= abs_tol {
            return GjkResult::Intersection;
        }

        let support = CsoPoint::from_shapes(pos12, g1, g2, &-proj);

        // Lower bound of the distance given by the new supporting plane.
        let lower_bound = proj.dot(&support.point.coords) / dist;
        if lower_bound > max_dist {
            return GjkResult::NoIntersection(Unit::new_unchecked(-proj / dist));
        }

        let no_progress = simplex
            .iter()
            .any(|pt| (pt.point - support.point).norm_squared() <= abs_tol * abs_tol);

        if no_progress || dist * dist - proj.dot(&support.point.coords) <= rel_tol * dist * dist {
            if dist > max_dist {
                return GjkResult::NoIntersection(Unit::new_unchecked(-proj / dist));
            }

            let mut p1 = Vector::zeros();
            let mut p2 = Vector::zeros();
            for (pt, w) in simplex.iter().zip(weights.iter()) {
                p1 += pt.orig1.coords * *w;
                p2 += pt.orig2.coords * *w;
            }
            return GjkResult::ClosestPoints(
                Point::from(p1),
                Point::from(p2),
                Unit::new_unchecked(-proj / dist),
            );
        }

        simplex.push(support);
    }

    // Convergence failure, typically from nearly-touching configurations. Report the
    // tightest state reached.
    GjkResult::Intersection
}

/// Tests whether two support-mapped shapes are intersecting.
pub fn intersection_test(
    pos12: &Isometry<Real>,
    g1: &dyn SupportMap,
    g2: &dyn SupportMap,
) -> bool {
    matches!(
        closest_points(pos12, g1, g2, Real::MAX),
        GjkResult::Intersection
    )
}
