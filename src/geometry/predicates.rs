//! Planar (XY) predicates and small vector helpers.
//!
//! Double-precision predicates shared by the mesh queries, the splitting
//! operators, and the Delaunay triangulator. All `_xy` functions ignore any
//! z-coordinate: callers project onto the XY plane first. Point-in-triangle
//! containment supports an inclusive boundary convention (points exactly on
//! an edge count as inside) so that a scan over a triangulation claims every
//! query point exactly once.

const EPS: f64 = 1e-12;

/// 2D point/vector, `[x, y]`.
pub type Point2 = [f64; 2];
/// 3D point/vector, `[x, y, z]`.
pub type Point3 = [f64; 3];

#[inline]
pub(crate) fn sub(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub(crate) fn cross(a: Point3, b: Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn norm(a: Point3) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

/// Signed area of the parallelogram spanned by `b - a` and `c - a`,
/// positive when `a`, `b`, `c` wind counterclockwise.
#[inline]
pub fn cross_xy(a: Point2, b: Point2, c: Point2) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// True iff `a`, `b`, `c` wind counterclockwise in the XY plane.
#[inline]
pub fn is_ccw_xy(a: Point2, b: Point2, c: Point2) -> bool {
    cross_xy(a, b, c) > 0.0
}

/// Euclidean distance between two XY points.
#[inline]
pub fn distance_xy(a: Point2, b: Point2) -> f64 {
    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
}

/// Midpoint of two 3D points.
#[inline]
pub fn midpoint(a: Point3, b: Point3) -> Point3 {
    [
        0.5 * (a[0] + b[0]),
        0.5 * (a[1] + b[1]),
        0.5 * (a[2] + b[2]),
    ]
}

/// Arithmetic mean of a non-empty point set.
pub fn centroid_points(points: &[Point3]) -> Point3 {
    let n = points.len() as f64;
    let mut c = [0.0; 3];
    for p in points {
        c[0] += p[0];
        c[1] += p[1];
        c[2] += p[2];
    }
    [c[0] / n, c[1] / n, c[2] / n]
}

/// Unit normal of the triangle `a`, `b`, `c`, or `None` when the vertices
/// are (numerically) collinear.
pub fn unit_normal(a: Point3, b: Point3, c: Point3) -> Option<Point3> {
    let n = cross(sub(b, a), sub(c, a));
    let len = norm(n);
    if len < EPS {
        return None;
    }
    Some([n[0] / len, n[1] / len, n[2] / len])
}

/// Point-in-triangle containment in the XY plane.
///
/// With `inclusive` set, points exactly on an edge or vertex count as
/// inside. Works for either triangle winding.
pub fn is_point_in_triangle_xy(pt: Point2, a: Point2, b: Point2, c: Point2, inclusive: bool) -> bool {
    let d1 = cross_xy(a, b, pt);
    let d2 = cross_xy(b, c, pt);
    let d3 = cross_xy(c, a, pt);
    if inclusive {
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    } else {
        (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
    }
}

/// Circumcircle of three XY points as `(center, radius)`, or `None` when the
/// points are (numerically) collinear.
pub fn circle_from_points_xy(a: Point2, b: Point2, c: Point2) -> Option<(Point2, f64)> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < EPS {
        return None;
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let center = [ux, uy];
    Some((center, distance_xy(center, a)))
}

/// True iff `pt` lies strictly inside the circle `(center, radius)`.
#[inline]
pub fn is_point_in_circle_xy(pt: Point2, center: Point2, radius: f64) -> bool {
    distance_xy(pt, center) < radius
}

/// Even-odd point-in-polygon containment in the XY plane.
///
/// The polygon is a closed vertex loop without a repeated first/last point.
pub fn is_point_in_polygon_xy(pt: Point2, polygon: &[Point2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((pi[1] > pt[1]) != (pj[1] > pt[1]))
            && pt[0] < (pj[0] - pi[0]) * (pt[1] - pi[1]) / (pj[1] - pi[1]) + pi[0]
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Sort keyed points into counterclockwise rotational order around `center`.
///
/// Rotational insertion sort: the first point seeds the ordered list; each
/// subsequent point scans forward from the head for the first gap where it
/// fits (per [`is_ccw_xy`]), falling back to a backward scan from the tail
/// when the forward scan stops at the head. Quadratic for high-degree
/// centers, which is acceptable at mesh-vertex degrees.
pub fn sorted_ccw_xy<K: Copy>(center: Point2, neighbors: &[(K, Point2)]) -> Vec<K> {
    if neighbors.is_empty() {
        return Vec::new();
    }
    let mut ordered: Vec<usize> = vec![0];
    for i in 1..neighbors.len() {
        let c = neighbors[i].1;
        let n = ordered.len();
        let mut pos = 0;
        while pos < n && !is_ccw_xy(center, neighbors[ordered[pos]].1, c) {
            pos += 1;
        }
        if pos == 0 {
            // The head already sees `c` counterclockwise; walk backward from
            // the tail while that keeps holding to find the true gap.
            let mut back = n as isize - 1;
            while back >= 0 && is_ccw_xy(center, neighbors[ordered[back as usize]].1, c) {
                back -= 1;
            }
            pos = (back + 1) as usize;
        }
        ordered.insert(pos, i);
    }
    ordered.into_iter().map(|i| neighbors[i].0).collect()
}

/// Axis-aligned bounding box of an XY point set as `(min, max)`.
pub fn bounding_box_xy(points: &[Point2]) -> (Point2, Point2) {
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in points {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }
    (min, max)
}
