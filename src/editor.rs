use crate::circle::{Circle, CircleId, CircleSet, PctOffset, PctPoint};
use crate::geometry;
use crate::history::UndoStack;

/// Draw gestures whose computed radius stays at or below this are discarded.
pub const MIN_DRAW_RADIUS: f32 = 1.0;

/// Resizing never shrinks a circle below this radius.
pub const MIN_RADIUS: f32 = 1.0;

/// Fallback press tolerance around the resize handle, in percent units; the
/// shell overwrites it each frame from the handle's on-screen size.
pub const DEFAULT_HANDLE_HIT_RADIUS: f32 = 2.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeStart {
    pub mx: f32,
    pub my: f32,
    pub r: f32,
}

/// Ephemeral interaction state. At most one of `drawing`, `drag_id`,
/// `resize_id` is active at a time; every id either is `None` or references a
/// live circle (delete and undo-restore prune stale ones).
#[derive(Clone, Debug)]
pub struct EditState {
    pub drag_id: Option<CircleId>,
    pub drag_offset: PctOffset,
    pub drawing: Option<PctPoint>,
    pub resize_id: Option<CircleId>,
    pub resize_start: Option<ResizeStart>,
    pub last_mouse: Option<PctPoint>,
    pub hover_id: Option<CircleId>,
    pub selected_id: Option<CircleId>,
    /// Swallows the click that trails a create gesture so it cannot deselect
    /// the just-created circle.
    pub absorb_next_click: bool,
    pub handle_hit_radius: f32,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            drag_id: None,
            drag_offset: PctOffset::default(),
            drawing: None,
            resize_id: None,
            resize_start: None,
            last_mouse: None,
            hover_id: None,
            selected_id: None,
            absorb_next_click: false,
            handle_hit_radius: DEFAULT_HANDLE_HIT_RADIUS,
        }
    }
}

impl EditState {
    pub fn gesture_active(&self) -> bool {
        self.drawing.is_some() || self.drag_id.is_some() || self.resize_id.is_some()
    }

    pub fn has_transient(&self) -> bool {
        self.gesture_active() || self.last_mouse.is_some() || self.hover_id.is_some()
    }

    /// Clears everything a pointer-leave resets. Selection survives.
    pub fn clear_transient(&mut self) {
        self.drag_id = None;
        self.drag_offset = PctOffset::default();
        self.drawing = None;
        self.resize_id = None;
        self.resize_start = None;
        self.last_mouse = None;
        self.hover_id = None;
    }

    /// Drops id references that no longer resolve in the store.
    pub fn prune(&mut self, circles: &CircleSet) {
        if self.drag_id.is_some_and(|id| circles.get(id).is_none()) {
            self.drag_id = None;
            self.drag_offset = PctOffset::default();
        }
        if self.resize_id.is_some_and(|id| circles.get(id).is_none()) {
            self.resize_id = None;
            self.resize_start = None;
        }
        if self.hover_id.is_some_and(|id| circles.get(id).is_none()) {
            self.hover_id = None;
        }
        if self.selected_id.is_some_and(|id| circles.get(id).is_none()) {
            self.selected_id = None;
        }
    }
}

/// Pointer input after coordinate mapping. Positions are percent space; the
/// shell never dispatches an event it could not map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasEvent {
    PointerDown(PctPoint),
    PointerMove(PctPoint),
    PointerUp(PctPoint),
    PointerLeave,
    Click(PctPoint),
    Cancel,
}

/// The circle collection plus everything the gesture engine needs around it.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
    pub circles: CircleSet,
    pub edit: EditState,
    pub history: UndoStack<Vec<Circle>>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_circles(circles: Vec<Circle>) -> Self {
        Self {
            circles: CircleSet::from_circles(circles),
            ..Self::default()
        }
    }

    pub fn selected_circle(&self) -> Option<&Circle> {
        self.edit.selected_id.and_then(|id| self.circles.get(id))
    }

    /// Deletes a circle with an undo snapshot and clears any edit-state
    /// reference to it. Unknown ids are ignored.
    pub fn delete_circle(&mut self, id: CircleId) {
        if self.circles.get(id).is_none() {
            return;
        }
        self.history.push(self.circles.snapshot());
        self.circles.delete(id);
        self.edit.prune(&self.circles);
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.edit.selected_id {
            self.delete_circle(id);
        }
    }

    /// Pops one undo snapshot and restores the store from it; no-op when the
    /// stack is empty.
    pub fn cancel_one(&mut self) {
        if let Some(snapshot) = self.history.cancel_one() {
            self.circles.replace(snapshot);
            self.edit.prune(&self.circles);
        }
    }
}

/// The interaction engine: one pure-ish transition per event, no closures
/// over captured state, no rendering dependencies. Every handler is a
/// defensive no-op when its required state is absent.
pub fn dispatch(state: &mut EditorState, event: CanvasEvent) {
    match event {
        CanvasEvent::PointerDown(pos) => pointer_down(state, pos),
        CanvasEvent::PointerMove(pos) => pointer_move(state, pos),
        CanvasEvent::PointerUp(pos) => pointer_up(state, pos),
        CanvasEvent::PointerLeave => pointer_leave(state),
        CanvasEvent::Click(pos) => click(state, pos),
        CanvasEvent::Cancel => cancel(state),
    }
}

/// Press discrimination order: resize handle of the hovered circle, then
/// circle body, then empty canvas (begin draw).
fn pointer_down(state: &mut EditorState, pos: PctPoint) {
    state.edit.absorb_next_click = false;
    if state.edit.gesture_active() {
        return;
    }

    if let Some(id) = handle_hit(&state.edit, &state.circles, pos) {
        if let Some(circle) = state.circles.get(id) {
            state.edit.resize_start = Some(ResizeStart {
                mx: pos.x,
                my: pos.y,
                r: circle.r,
            });
            state.edit.resize_id = Some(id);
            return;
        }
    }

    if let Some(id) = state.circles.hit_test(pos) {
        // A press on a circle starts a drag and must not also begin a draw.
        if let Some(circle) = state.circles.get(id) {
            state.edit.drag_offset = PctOffset {
                dx: circle.x - pos.x,
                dy: circle.y - pos.y,
            };
            state.edit.drag_id = Some(id);
        }
        return;
    }

    state.history.push(state.circles.snapshot());
    state.edit.drawing = Some(pos);
}

fn pointer_move(state: &mut EditorState, pos: PctPoint) {
    if let Some(id) = state.edit.resize_id {
        let Some(center) = state.circles.get(id).map(Circle::center) else {
            return;
        };
        if !state.history.gesture_pushed() {
            state.history.push_if_needed(state.circles.snapshot());
        }
        state.circles.set_radius(id, center.distance(pos).max(MIN_RADIUS));
        state.edit.last_mouse = Some(pos);
    } else if let Some(id) = state.edit.drag_id {
        if !state.history.gesture_pushed() {
            state.history.push_if_needed(state.circles.snapshot());
        }
        let offset = state.edit.drag_offset;
        state
            .circles
            .move_center(id, PctPoint::new(pos.x + offset.dx, pos.y + offset.dy));
        state.edit.last_mouse = Some(pos);
    } else if state.edit.drawing.is_some() {
        // Only the live preview follows; the circle appears on release.
        state.edit.last_mouse = Some(pos);
    } else {
        let hover = hover_target(&state.edit, &state.circles, pos);
        state.edit.hover_id = hover;
        state.edit.last_mouse = if hover.is_some() { Some(pos) } else { None };
    }
}

fn pointer_up(state: &mut EditorState, pos: PctPoint) {
    if state.edit.resize_id.is_some() {
        state.edit.resize_id = None;
        state.edit.resize_start = None;
        state.history.end_gesture();
    } else if state.edit.drag_id.is_some() {
        state.edit.drag_id = None;
        state.edit.drag_offset = PctOffset::default();
        state.history.end_gesture();
    } else if let Some(start) = state.edit.drawing {
        // The gesture drags out a diameter: center at the midpoint, radius
        // half the dragged distance.
        let radius = start.distance(pos) * 0.5;
        if radius > MIN_DRAW_RADIUS {
            let id = state.circles.create(start.midpoint(pos), radius);
            state.edit.selected_id = Some(id);
            state.edit.absorb_next_click = true;
        }
        state.edit.drawing = None;
        state.edit.last_mouse = None;
    }
}

fn pointer_leave(state: &mut EditorState) {
    state.edit.clear_transient();
    state.history.end_gesture();
}

fn click(state: &mut EditorState, pos: PctPoint) {
    if state.edit.absorb_next_click {
        state.edit.absorb_next_click = false;
        return;
    }
    if let Some(id) = state.circles.hit_test(pos) {
        state.edit.selected_id = if state.edit.selected_id == Some(id) {
            None
        } else {
            Some(id)
        };
    } else {
        state.edit.selected_id = None;
    }
}

/// Escape. A draw gesture has its own implicit cancel (tiny radius discards),
/// so mid-draw the key is ignored.
fn cancel(state: &mut EditorState) {
    if state.edit.drawing.is_some() {
        return;
    }
    state.cancel_one();
}

/// Press test for the resize handle. Only the hovered circle shows one, at
/// the quadrant angle derived from the last pointer position, so hit-testing
/// recomputes the identical anchor the renderer drew.
fn handle_hit(edit: &EditState, circles: &CircleSet, pos: PctPoint) -> Option<CircleId> {
    let id = edit.hover_id?;
    let circle = circles.get(id)?;
    let angle = geometry::handle_angle_deg(circle.center(), edit.last_mouse);
    let anchor = geometry::handle_anchor(circle.center(), circle.r, angle);
    (anchor.distance(pos) <= edit.handle_hit_radius).then_some(id)
}

/// Hover sticks to the current circle while the pointer is on its body or on
/// its handle (the handle pokes outside the radius); otherwise the topmost
/// circle under the pointer wins.
fn hover_target(edit: &EditState, circles: &CircleSet, pos: PctPoint) -> Option<CircleId> {
    if let Some(id) = edit.hover_id {
        if let Some(circle) = circles.get(id) {
            if circle.contains(pos) || handle_hit(edit, circles, pos) == Some(id) {
                return Some(id);
            }
        }
    }
    circles.hit_test(pos)
}
