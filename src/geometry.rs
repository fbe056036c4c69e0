/// Geometry and collision primitives.
///
/// Everything here is a plain value type or a pure function.  Coordinates are
/// y-up: a `Rect` is anchored at its bottom-left corner.  Degenerate inputs
/// (zero-length vectors and segments, zero radii) resolve to a defined answer
/// instead of dividing by zero.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Magnitudes at or below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Max distance at which a point still counts as lying on a segment.
pub const ON_SEGMENT_TOLERANCE: f32 = 1e-4;

// ── Vectors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction, or `ZERO` for a (near) zero vector.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len <= EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector pointing at `angle` radians from the +x axis.
    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ── Shapes ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self { left, bottom, width, height }
    }

    /// A `width` × `height` rect centred on `center`.
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn top(&self) -> f32 {
        self.bottom + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.bottom + self.height / 2.0)
    }

    /// Grow the rect by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::new(
            self.left - margin,
            self.bottom - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.bottom),
            Vec2::new(self.right(), self.bottom),
            Vec2::new(self.right(), self.top()),
            Vec2::new(self.left, self.top()),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vec2,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Ellipse {
    pub const fn new(center: Vec2, radius_x: f32, radius_y: f32) -> Self {
        Self { center, radius_x, radius_y }
    }

    pub const fn circle(center: Vec2, radius: f32) -> Self {
        Self::new(center, radius, radius)
    }

    /// Largest axis-aligned ellipse that fits inside `rect`.
    pub fn inscribed(rect: &Rect) -> Self {
        Self::new(rect.center(), rect.width / 2.0, rect.height / 2.0)
    }
}

/// RGBA colour, components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

// ── Distances ────────────────────────────────────────────────────────────────

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Shortest distance from `p` to the segment `a`–`b`.
pub fn dist_point_line_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

pub fn is_point_on_line_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    dist_point_line_segment(p, a, b) <= ON_SEGMENT_TOLERANCE
}

// ── Point containment ────────────────────────────────────────────────────────

/// Edges are inclusive.
pub fn is_point_in_rect(p: Vec2, r: &Rect) -> bool {
    p.x >= r.left && p.x <= r.right() && p.y >= r.bottom && p.y <= r.top()
}

pub fn is_point_in_circle(p: Vec2, c: &Circle) -> bool {
    (p - c.center).length_squared() <= c.radius * c.radius
}

/// Normalised elliptical distance ≤ 1.  A degenerate ellipse behaves as the
/// segment (or point) it collapses to.
pub fn is_point_in_ellipse(p: Vec2, e: &Ellipse) -> bool {
    let dx = p.x - e.center.x;
    let dy = p.y - e.center.y;
    let flat_x = e.radius_x <= EPSILON;
    let flat_y = e.radius_y <= EPSILON;
    match (flat_x, flat_y) {
        (true, true) => dx.abs() <= EPSILON && dy.abs() <= EPSILON,
        (true, false) => dx.abs() <= EPSILON && dy.abs() <= e.radius_y,
        (false, true) => dy.abs() <= EPSILON && dx.abs() <= e.radius_x,
        (false, false) => {
            let nx = dx / e.radius_x;
            let ny = dy / e.radius_y;
            nx * nx + ny * ny <= 1.0
        }
    }
}

/// Crossing-number test.  Fewer than three vertices never contain anything.
pub fn is_point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) {
            let x_cross = vj.x + (p.y - vj.y) / (vi.y - vj.y) * (vi.x - vj.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

// ── Segments ─────────────────────────────────────────────────────────────────

/// Parameter of `p` along `a`–`b` (0 at `a`, 1 at `b`); 0 for a zero-length segment.
fn param_along(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON {
        0.0
    } else {
        (p - a).dot(ab) / len_sq
    }
}

/// Intersection of segments `p1`–`p2` and `q1`–`q2`.
///
/// Returns `(λ1, λ2)` such that the shared point is `p1 + (p2-p1)·λ1` and
/// `q1 + (q2-q1)·λ2`, both in `[0, 1]`.  Collinear overlapping segments report
/// the first shared endpoint.
pub fn intersect_line_segments(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Option<(f32, f32)> {
    let p = p2 - p1;
    let q = q2 - q1;
    let denom = p.cross(q);
    let p1q1 = q1 - p1;

    if denom.abs() > EPSILON {
        let lambda1 = p1q1.cross(q) / denom;
        let lambda2 = p1q1.cross(p) / denom;
        let in_range = |l: f32| (-EPSILON..=1.0 + EPSILON).contains(&l);
        return (in_range(lambda1) && in_range(lambda2))
            .then(|| (lambda1.clamp(0.0, 1.0), lambda2.clamp(0.0, 1.0)));
    }

    // Parallel (or zero-length): they meet only if an endpoint lies on the other.
    if is_point_on_line_segment(p1, q1, q2) {
        Some((0.0, param_along(p1, q1, q2)))
    } else if is_point_on_line_segment(p2, q1, q2) {
        Some((1.0, param_along(p2, q1, q2)))
    } else if is_point_on_line_segment(q1, p1, p2) {
        Some((param_along(q1, p1, p2), 0.0))
    } else if is_point_on_line_segment(q2, p1, p2) {
        Some((param_along(q2, p1, p2), 1.0))
    } else {
        None
    }
}

// ── Overlap predicates (touching counts) ─────────────────────────────────────

pub fn rects_overlap(r1: &Rect, r2: &Rect) -> bool {
    !(r1.right() < r2.left || r2.right() < r1.left || r1.top() < r2.bottom || r2.top() < r1.bottom)
}

pub fn rect_circle_overlap(r: &Rect, c: &Circle) -> bool {
    let closest = Vec2::new(
        c.center.x.clamp(r.left, r.right()),
        c.center.y.clamp(r.bottom, r.top()),
    );
    is_point_in_circle(closest, c)
}

pub fn circles_overlap(c1: &Circle, c2: &Circle) -> bool {
    let reach = c1.radius + c2.radius;
    (c1.center - c2.center).length_squared() <= reach * reach
}

pub fn segment_circle_overlap(a: Vec2, b: Vec2, c: &Circle) -> bool {
    dist_point_line_segment(c.center, a, b) <= c.radius
}

/// True if the circle's centre is inside the polygon or any edge touches it.
pub fn polygon_circle_overlap(vertices: &[Vec2], c: &Circle) -> bool {
    match vertices.len() {
        0 => false,
        1 => is_point_in_circle(vertices[0], c),
        n => {
            if is_point_in_polygon(c.center, vertices) {
                return true;
            }
            (0..n).any(|i| segment_circle_overlap(vertices[i], vertices[(i + 1) % n], c))
        }
    }
}
