//! Geometric entities of a document.
//!
//! Entities only ever refer to each other by [`Id`]; nothing here holds a
//! reference into the containers. `children` is the reverse edge of the
//! construction DAG: it lists every entity whose construction referenced
//! this one, and drives cascading deletion.

use crate::id::Id;

/// 2D point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: Id,
    /// Position in abstract units. Mutated only by the solver, and only
    /// while `floating` is set.
    pub x: f64,
    pub y: f64,
    /// Display label, assigned at creation and never changed.
    pub label: String,
    pub children: Vec<Id>,
    /// Whether the solver may move this point.
    pub floating: bool,
}

/// How a segment was constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentKind {
    /// Between two existing points.
    TwoPoints,
    /// From one existing point, at a fixed angle (degrees, math
    /// convention) and length; the far endpoint was materialized at
    /// construction.
    AbsAngle { angle_deg: f64, length: f64 },
    /// Like `AbsAngle`, but the angle is an offset from another segment's
    /// direction at construction time.
    RelAngle {
        offset_deg: f64,
        length: f64,
        reference: Id,
    },
}

/// Finite segment between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: Id,
    pub p1: Id,
    pub p2: Id,
    pub kind: SegmentKind,
    pub children: Vec<Id>,
}

/// How a circle was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleKind {
    /// Center point plus a radius (given directly, or measured to a
    /// circumference point at construction).
    Radius,
    /// Through three points; the center is a materialized circumcenter.
    ThreePoints,
}

/// A circle. The radius is frozen at construction: moving the center, a
/// circumference point or a defining point later does not recompute it.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub id: Id,
    pub kind: CircleKind,
    /// Center point. For `ThreePoints` this is the circumcenter point
    /// materialized at construction.
    pub center: Id,
    pub radius: f64,
    /// Construction points on the circumference: empty for a plain radius
    /// circle, one for a circumference-point circle, three for
    /// `ThreePoints`.
    pub points: Vec<Id>,
    pub children: Vec<Id>,
}

/// Arc of a circle, counter-clockwise from `start` to `end` around the
/// circle's center (in the uniform screen-inverted angular convention).
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub id: Id,
    pub circle: Id,
    pub start: Id,
    pub end: Id,
    pub children: Vec<Id>,
}

/// User-defined named value, usable in constraint expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// `None` means the variable has no value yet; expressions referencing
    /// it evaluate to unresolved.
    pub value: Option<f64>,
    /// Whether the solver chooses the value (shown as "auto" in the UI).
    /// Pinned variables keep whatever the user typed.
    pub determined: bool,
}

/// Which tool the UI currently has armed. The kernel stores this but never
/// reads it; tool behavior lives in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Point,
    Segment,
    Circle,
    Arc,
    Measure,
}
