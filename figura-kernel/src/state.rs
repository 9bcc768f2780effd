//! Document state: entity containers, constructors, cascading delete.
//!
//! The store owns entities by id; every cross-reference is an id, never an
//! index or pointer into a container. Constructors allocate the id, insert
//! the entity, and register it as a child of each entity its construction
//! referenced. That reverse edge is the whole deletion story: removing an
//! entity first removes everything downstream of it.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    constraints::{Constraint, ConstraintKind},
    entities::{Arc, Circle, CircleKind, Point, Segment, SegmentKind, Tool, Variable},
    expr::Bindings,
    geometry,
    id::{Id, IdGenerator},
    label::LabelGenerator,
};

/// All state for one document.
///
/// Cloning a state yields a fully independent copy; the constraint
/// validation path relies on this to run trial solves without touching the
/// caller's document.
#[derive(Debug, Clone)]
pub struct GeometryState {
    pub(crate) points: IndexMap<Id, Point>,
    pub(crate) segments: IndexMap<Id, Segment>,
    pub(crate) circles: IndexMap<Id, Circle>,
    pub(crate) arcs: IndexMap<Id, Arc>,
    pub(crate) variables: IndexMap<String, Variable>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) ids: IdGenerator,
    labels: LabelGenerator,

    /// UI-facing fields. The kernel stores them for the host but never
    /// reads them; they do not participate in solving.
    pub active_tool: Tool,
    pub selected: Vec<Id>,
    pub measure_history: Vec<String>,
    pub zoom: f64,
    pub offset: (f64, f64),
}

impl Default for GeometryState {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryState {
    /// A fresh, empty document: no entities, `Select` tool, zoom 1,
    /// origin offset.
    pub fn new() -> Self {
        Self {
            points: IndexMap::new(),
            segments: IndexMap::new(),
            circles: IndexMap::new(),
            arcs: IndexMap::new(),
            variables: IndexMap::new(),
            constraints: Vec::new(),
            ids: IdGenerator::default(),
            labels: LabelGenerator::default(),
            active_tool: Tool::Select,
            selected: Vec::new(),
            measure_history: Vec::new(),
            zoom: 1.0,
            offset: (0.0, 0.0),
        }
    }

    pub fn point(&self, id: Id) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn segment(&self, id: Id) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn circle(&self, id: Id) -> Option<&Circle> {
        self.circles.get(&id)
    }

    pub fn arc(&self, id: Id) -> Option<&Arc> {
        self.arcs.get(&id)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn points(&self) -> &IndexMap<Id, Point> {
        &self.points
    }

    pub fn segments(&self) -> &IndexMap<Id, Segment> {
        &self.segments
    }

    pub fn circles(&self) -> &IndexMap<Id, Circle> {
        &self.circles
    }

    pub fn arcs(&self) -> &IndexMap<Id, Arc> {
        &self.arcs
    }

    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Current numeric value of every variable that has one, in
    /// declaration order. This is what constraint expressions evaluate
    /// against.
    pub(crate) fn bindings(&self) -> Bindings {
        self.variables
            .values()
            .filter_map(|v| v.value.map(|value| (v.name.clone(), value)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Constructors.
    //
    // Each returns the new entity's id, or `None` when a referenced parent
    // is missing (or the construction is degenerate), leaving the state
    // untouched.

    /// Add a free point. Consumes the next label.
    pub fn add_point(&mut self, x: f64, y: f64) -> Id {
        let id = self.ids.next_id();
        let label = self.labels.next_label();
        self.points.insert(
            id,
            Point {
                id,
                x,
                y,
                label,
                children: Vec::new(),
                floating: false,
            },
        );
        id
    }

    /// Let the solver move this point (or pin it again).
    pub fn set_floating(&mut self, point: Id, floating: bool) {
        if let Some(p) = self.points.get_mut(&point) {
            p.floating = floating;
        }
    }

    /// Segment between two existing, distinct points.
    pub fn add_segment_two_points(&mut self, p1: Id, p2: Id) -> Option<Id> {
        if p1 == p2 || !self.points.contains_key(&p1) || !self.points.contains_key(&p2) {
            return None;
        }
        Some(self.insert_segment(p1, p2, SegmentKind::TwoPoints))
    }

    /// Segment from an existing point at a fixed angle (degrees, math
    /// convention) and length. The far endpoint is materialized; the Y
    /// negation maps math angles onto screen coordinates.
    pub fn add_segment_abs_angle(&mut self, p1: Id, angle_deg: f64, length: f64) -> Option<Id> {
        let start = self.points.get(&p1)?;
        let (x, y) = (start.x, start.y);
        let p2 = self.add_point_at_angle(x, y, angle_deg, length);
        Some(self.insert_segment(p1, p2, SegmentKind::AbsAngle { angle_deg, length }))
    }

    /// Segment from an existing point at an angle relative to another
    /// segment's direction at construction time.
    pub fn add_segment_rel_angle(
        &mut self,
        p1: Id,
        reference: Id,
        offset_deg: f64,
        length: f64,
    ) -> Option<Id> {
        let start = self.points.get(&p1)?;
        let (x, y) = (start.x, start.y);
        let ref_seg = self.segments.get(&reference)?;
        let a = self.points.get(&ref_seg.p1)?;
        let b = self.points.get(&ref_seg.p2)?;
        let angle_deg = geometry::segment_angle((a.x, a.y), (b.x, b.y)) + offset_deg;

        let p2 = self.add_point_at_angle(x, y, angle_deg, length);
        let id = self.insert_segment(
            p1,
            p2,
            SegmentKind::RelAngle {
                offset_deg,
                length,
                reference,
            },
        );
        self.push_child(reference, id);
        Some(id)
    }

    fn add_point_at_angle(&mut self, x: f64, y: f64, angle_deg: f64, length: f64) -> Id {
        let rad = angle_deg.to_radians();
        self.add_point(x + length * libm::cos(rad), y - length * libm::sin(rad))
    }

    fn insert_segment(&mut self, p1: Id, p2: Id, kind: SegmentKind) -> Id {
        let id = self.ids.next_id();
        self.segments.insert(
            id,
            Segment {
                id,
                p1,
                p2,
                kind,
                children: Vec::new(),
            },
        );
        self.push_child(p1, id);
        self.push_child(p2, id);
        id
    }

    /// Circle from a center point and an explicit radius.
    pub fn add_circle_radius(&mut self, center: Id, radius: f64) -> Option<Id> {
        if !self.points.contains_key(&center) {
            return None;
        }
        Some(self.insert_circle(CircleKind::Radius, center, radius, Vec::new()))
    }

    /// Circle from a center point through a circumference point. The
    /// radius is measured now and frozen; moving either point later does
    /// not update it.
    pub fn add_circle_circumference(&mut self, center: Id, through: Id) -> Option<Id> {
        let c = self.points.get(&center)?;
        let t = self.points.get(&through)?;
        let radius = geometry::euclidean_distance((c.x, c.y), (t.x, t.y));
        Some(self.insert_circle(CircleKind::Radius, center, radius, vec![through]))
    }

    /// Circle through three points. Materializes the circumcenter as a new
    /// point and freezes the radius; `None` for collinear inputs.
    pub fn add_circle_three_points(&mut self, p1: Id, p2: Id, p3: Id) -> Option<Id> {
        let a = self.points.get(&p1)?;
        let b = self.points.get(&p2)?;
        let c = self.points.get(&p3)?;
        let ((cx, cy), radius) = geometry::circumcircle((a.x, a.y), (b.x, b.y), (c.x, c.y))?;
        let center = self.add_point(cx, cy);
        Some(self.insert_circle(CircleKind::ThreePoints, center, radius, vec![p1, p2, p3]))
    }

    fn insert_circle(&mut self, kind: CircleKind, center: Id, radius: f64, points: Vec<Id>) -> Id {
        let id = self.ids.next_id();
        let on_circumference = points.clone();
        self.circles.insert(
            id,
            Circle {
                id,
                kind,
                center,
                radius,
                points,
                children: Vec::new(),
            },
        );
        self.push_child(center, id);
        for p in on_circumference {
            self.push_child(p, id);
        }
        id
    }

    /// Arc of an existing circle, counter-clockwise from `start` to `end`.
    pub fn add_arc(&mut self, circle: Id, start: Id, end: Id) -> Option<Id> {
        if !self.circles.contains_key(&circle)
            || !self.points.contains_key(&start)
            || !self.points.contains_key(&end)
        {
            return None;
        }
        let id = self.ids.next_id();
        self.arcs.insert(
            id,
            Arc {
                id,
                circle,
                start,
                end,
                children: Vec::new(),
            },
        );
        self.push_child(circle, id);
        self.push_child(start, id);
        self.push_child(end, id);
        Some(id)
    }

    /// Declare a named variable. Names are unique; a duplicate is
    /// rejected.
    pub fn add_variable(
        &mut self,
        name: &str,
        value: Option<f64>,
        determined: bool,
    ) -> Option<&Variable> {
        if self.variables.contains_key(name) {
            return None;
        }
        self.variables.insert(
            name.to_owned(),
            Variable {
                name: name.to_owned(),
                value,
                determined,
            },
        );
        self.variables.get(name)
    }

    /// Set (or clear) a variable's value, as the UI edit path does for
    /// pinned variables.
    pub fn set_variable_value(&mut self, name: &str, value: Option<f64>) {
        if let Some(v) = self.variables.get_mut(name) {
            v.value = value;
        }
    }

    /// Append a constraint. The candidate is first trial-solved on a clone
    /// of the document; if the trial fails to converge the constraint is
    /// rejected and the state unchanged. On success the constraint is kept
    /// and a real solve runs.
    pub fn add_constraint(&mut self, kind: ConstraintKind) -> Option<Id> {
        if !self.constraint_refs_resolve(&kind) {
            return None;
        }
        if !self.validate_constraint(&kind) {
            debug!(kind = kind.kind_name(), "constraint rejected by trial solve");
            return None;
        }
        let id = self.push_constraint(kind);
        let outcome = self.solve();
        debug!(
            constraint = id,
            success = outcome.success,
            iterations = outcome.iterations,
            "constraint accepted"
        );
        Some(id)
    }

    /// Insert without validation. The validation path itself uses this on
    /// its clone.
    pub(crate) fn push_constraint(&mut self, kind: ConstraintKind) -> Id {
        let id = self.ids.next_id();
        for parent in kind.referenced_ids() {
            self.push_child(parent, id);
        }
        self.constraints.push(Constraint { id, kind });
        id
    }

    fn constraint_refs_resolve(&self, kind: &ConstraintKind) -> bool {
        match kind {
            ConstraintKind::Distance { p1, p2, .. } | ConstraintKind::Angle { p1, p2, .. } => {
                self.points.contains_key(p1) && self.points.contains_key(p2)
            }
            ConstraintKind::PointOnSegment { point, segment } => {
                self.points.contains_key(point) && self.segments.contains_key(segment)
            }
            ConstraintKind::PointOnCircle { point, circle } => {
                self.points.contains_key(point) && self.circles.contains_key(circle)
            }
            ConstraintKind::PointOnArc { point, arc } => {
                self.points.contains_key(point) && self.arcs.contains_key(arc)
            }
            ConstraintKind::Equation { .. } => true,
        }
    }

    // ------------------------------------------------------------------
    // Dependency-graph bookkeeping.

    /// Register `child` under `parent`, whatever kind the parent is. A
    /// child appears at most once.
    fn push_child(&mut self, parent: Id, child: Id) {
        let children = if let Some(p) = self.points.get_mut(&parent) {
            &mut p.children
        } else if let Some(s) = self.segments.get_mut(&parent) {
            &mut s.children
        } else if let Some(c) = self.circles.get_mut(&parent) {
            &mut c.children
        } else if let Some(a) = self.arcs.get_mut(&parent) {
            &mut a.children
        } else {
            return;
        };
        if !children.contains(&child) {
            children.push(child);
        }
    }

    fn remove_child(&mut self, parent: Id, child: Id) {
        let children = if let Some(p) = self.points.get_mut(&parent) {
            &mut p.children
        } else if let Some(s) = self.segments.get_mut(&parent) {
            &mut s.children
        } else if let Some(c) = self.circles.get_mut(&parent) {
            &mut c.children
        } else if let Some(a) = self.arcs.get_mut(&parent) {
            &mut a.children
        } else {
            return;
        };
        children.retain(|&c| c != child);
    }

    // ------------------------------------------------------------------
    // Cascading delete.

    /// Delete an entity and, transitively, everything constructed in
    /// reference to it. Children go first (post-order), then the entity's
    /// back-references are removed from its parents, then the entity
    /// itself. A stale id is a no-op.
    pub fn delete_entity(&mut self, id: Id) {
        if self.points.contains_key(&id) {
            self.delete_point(id);
        } else if self.segments.contains_key(&id) {
            self.delete_segment(id);
        } else if self.circles.contains_key(&id) {
            self.delete_circle(id);
        } else if self.arcs.contains_key(&id) {
            self.delete_arc(id);
        } else if self.constraints.iter().any(|c| c.id == id) {
            self.delete_constraint(id);
        }
    }

    fn delete_point(&mut self, id: Id) {
        let Some(point) = self.points.get(&id) else {
            return;
        };
        let children = point.children.clone();
        for child in children {
            self.delete_entity(child);
        }
        trace!(point = id, "deleting point");
        self.points.shift_remove(&id);
    }

    fn delete_segment(&mut self, id: Id) {
        let Some(seg) = self.segments.get(&id) else {
            return;
        };
        let children = seg.children.clone();
        let (p1, p2) = (seg.p1, seg.p2);
        let reference = match seg.kind {
            SegmentKind::RelAngle { reference, .. } => Some(reference),
            _ => None,
        };
        for child in children {
            self.delete_entity(child);
        }
        self.remove_child(p1, id);
        self.remove_child(p2, id);
        if let Some(r) = reference {
            self.remove_child(r, id);
        }
        trace!(segment = id, "deleting segment");
        self.segments.shift_remove(&id);
    }

    fn delete_circle(&mut self, id: Id) {
        let Some(circle) = self.circles.get(&id) else {
            return;
        };
        let children = circle.children.clone();
        let center = circle.center;
        let points = circle.points.clone();
        for child in children {
            self.delete_entity(child);
        }
        self.remove_child(center, id);
        for p in points {
            self.remove_child(p, id);
        }
        trace!(circle = id, "deleting circle");
        self.circles.shift_remove(&id);
    }

    fn delete_arc(&mut self, id: Id) {
        let Some(arc) = self.arcs.get(&id) else {
            return;
        };
        let children = arc.children.clone();
        let (circle, start, end) = (arc.circle, arc.start, arc.end);
        for child in children {
            self.delete_entity(child);
        }
        self.remove_child(circle, id);
        self.remove_child(start, id);
        self.remove_child(end, id);
        trace!(arc = id, "deleting arc");
        self.arcs.shift_remove(&id);
    }

    fn delete_constraint(&mut self, id: Id) {
        let Some(pos) = self.constraints.iter().position(|c| c.id == id) else {
            return;
        };
        for parent in self.constraints[pos].kind.referenced_ids() {
            self.remove_child(parent, id);
        }
        trace!(constraint = id, "deleting constraint");
        self.constraints.remove(pos);
    }

    // ------------------------------------------------------------------
    // UI-facing mutations. These touch only UI fields and never interact
    // with the solver.

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
        self.selected.clear();
    }

    pub fn add_to_measure_history(&mut self, entry: impl Into<String>) {
        self.measure_history.push(entry.into());
    }

    pub fn clear_measure_history(&mut self) {
        self.measure_history.clear();
    }
}
