use egui::{
    vec2, Align2, Context, CursorIcon, FontId, Painter, Pos2, Rect, Response, Rounding, Sense,
    Shape, Stroke, Ui,
};

use crate::app::EditorImage;
use crate::editor::{dispatch, CanvasEvent, EditorState};
use crate::geometry;
use crate::theme::AppTheme;

const HANDLE_SIZE_PX: f32 = 20.0;
const IMAGE_MARGIN_PX: f32 = 32.0;

pub fn show_canvas(
    ui: &mut Ui,
    ctx: &Context,
    theme: &AppTheme,
    image: Option<&mut EditorImage>,
    state: &mut EditorState,
) {
    let Some(image) = image else {
        empty_canvas(ui, theme);
        return;
    };
    image.ensure_texture(ctx);

    let available = ui.available_size();
    let (canvas_rect, response) = ui.allocate_exact_size(available, Sense::click_and_drag());

    let image_size = image.size_vec2();
    let fit = ((available.x - IMAGE_MARGIN_PX) / image_size.x)
        .min((available.y - IMAGE_MARGIN_PX) / image_size.y)
        .clamp(0.05, 4.0);
    let image_rect = Rect::from_center_size(canvas_rect.center(), image_size * fit);

    let painter = ui.painter_at(canvas_rect);
    painter.rect_filled(canvas_rect, 12.0, theme.surfaces.canvas_bg);
    let image_card = image_rect.expand(10.0);
    painter.rect_filled(image_card, 14.0, theme.surfaces.panel_bg);
    painter.rect_stroke(image_card, 14.0, Stroke::new(1.0, theme.surfaces.stroke_soft));

    if let Some(texture) = image.texture.as_ref() {
        painter.image(
            texture.id(),
            image_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    // Keep the core's handle press tolerance in step with the drawn handle.
    let px_basis = (image_rect.width() + image_rect.height()) * 0.5;
    if px_basis > 0.0 {
        state.edit.handle_hit_radius = (HANDLE_SIZE_PX * 0.5 + 2.0) / px_basis * 100.0;
    }

    draw_circles(&painter, theme, state, image_rect);
    draw_preview(&painter, theme, state, image_rect);
    draw_handle(&painter, theme, state, image_rect);

    handle_pointer_interaction(ctx, state, &response, image_rect);

    if response.hovered() {
        ctx.set_cursor_icon(cursor_for(state));
    }
}

fn empty_canvas(ui: &mut Ui, theme: &AppTheme) {
    let (rect, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 12.0, theme.surfaces.canvas_bg);
    painter.rect_stroke(rect, 12.0, Stroke::new(1.0, theme.surfaces.stroke_soft));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "Open a photo (Ctrl+O)",
        FontId::proportional(18.0),
        theme.text.secondary,
    );
}

fn draw_circles(painter: &Painter, theme: &AppTheme, state: &EditorState, image_rect: Rect) {
    for circle in state.circles.circles() {
        let selected = state.edit.selected_id == Some(circle.id);
        let center = geometry::percent_to_screen(circle.center(), image_rect);
        let r_px = geometry::radius_to_screen(circle.r, image_rect);

        let (fill, stroke_color) = if selected {
            (
                theme.marks.circle_fill_selected,
                theme.marks.circle_stroke_selected,
            )
        } else {
            (theme.marks.circle_fill, theme.marks.circle_stroke)
        };
        painter.circle_filled(center, r_px, fill);
        painter.circle_stroke(center, r_px, Stroke::new(2.5, stroke_color));

        let label_pos = geometry::label_position(
            center,
            r_px,
            geometry::LABEL_ANGLE_DEG,
            geometry::LABEL_OFFSET_PX,
        );
        painter.text(
            label_pos,
            Align2::CENTER_CENTER,
            (circle.index + 1).to_string(),
            FontId::proportional(16.0),
            stroke_color,
        );
    }
}

/// Dashed outline of the circle the current draw gesture would create. Shown
/// only once the gesture is large enough to matter.
fn draw_preview(painter: &Painter, theme: &AppTheme, state: &EditorState, image_rect: Rect) {
    let (Some(start), Some(mouse)) = (state.edit.drawing, state.edit.last_mouse) else {
        return;
    };
    let r = start.distance(mouse) * 0.5;
    if r <= 0.5 {
        return;
    }

    let center = geometry::percent_to_screen(start.midpoint(mouse), image_rect);
    let r_px = geometry::radius_to_screen(r, image_rect);
    painter.circle_filled(center, r_px, theme.marks.preview_fill);
    let outline = circle_polyline(center, r_px, 56);
    painter.extend(Shape::dashed_line(
        &outline,
        Stroke::new(2.0, theme.marks.preview_stroke),
        4.0,
        3.0,
    ));
}

/// Resize handle for the hovered circle, at the quadrant angle the core also
/// uses for hit-testing.
fn draw_handle(painter: &Painter, theme: &AppTheme, state: &EditorState, image_rect: Rect) {
    if state.edit.drawing.is_some() || state.edit.drag_id.is_some() {
        return;
    }
    let Some(id) = state.edit.hover_id else {
        return;
    };
    if state.edit.resize_id.is_some_and(|rid| rid != id) {
        return;
    }
    let Some(circle) = state.circles.get(id) else {
        return;
    };

    let angle = geometry::handle_angle_deg(circle.center(), state.edit.last_mouse);
    let anchor = geometry::handle_anchor(circle.center(), circle.r, angle);
    let screen = geometry::percent_to_screen(anchor, image_rect);
    let rect = Rect::from_center_size(screen, vec2(HANDLE_SIZE_PX, HANDLE_SIZE_PX));
    painter.rect_filled(rect, Rounding::ZERO, theme.marks.handle_fill);
    painter.rect_stroke(rect, Rounding::ZERO, Stroke::new(1.0, theme.marks.handle_stroke));
}

/// Translates egui pointer input into core events. Every position goes
/// through the coordinate mapper; events that cannot be mapped are dropped.
fn handle_pointer_interaction(
    ctx: &Context,
    state: &mut EditorState,
    response: &Response,
    image_rect: Rect,
) {
    let pointer_pos = ctx.input(|input| input.pointer.interact_pos());
    let inside = pointer_pos.is_some_and(|pos| image_rect.contains(pos));
    if !inside {
        // Leaving the image mid-gesture must not leave stuck state behind.
        if state.edit.has_transient() {
            dispatch(state, CanvasEvent::PointerLeave);
        }
        return;
    }
    let Some(pos) = pointer_pos.and_then(|p| geometry::to_percent(p, image_rect)) else {
        return;
    };

    if response.drag_started() {
        let press = ctx
            .input(|input| input.pointer.press_origin())
            .and_then(|p| geometry::to_percent(p, image_rect))
            .unwrap_or(pos);
        dispatch(state, CanvasEvent::PointerDown(press));
    }

    dispatch(state, CanvasEvent::PointerMove(pos));

    if response.drag_stopped() {
        dispatch(state, CanvasEvent::PointerUp(pos));
        // The DOM fires a trailing click after a drag; egui does not. Feed
        // the absorb guard the click it is waiting for so it cannot go stale.
        if state.edit.absorb_next_click {
            dispatch(state, CanvasEvent::Click(pos));
        }
    }

    if response.clicked() {
        dispatch(state, CanvasEvent::Click(pos));
    }
}

fn cursor_for(state: &EditorState) -> CursorIcon {
    let edit = &state.edit;
    if edit.resize_id.is_some() {
        CursorIcon::ResizeHorizontal
    } else if edit.drag_id.is_some() {
        CursorIcon::Grabbing
    } else if edit.drawing.is_some() {
        CursorIcon::Crosshair
    } else if edit.hover_id.is_some() {
        CursorIcon::Grab
    } else {
        CursorIcon::Crosshair
    }
}

fn circle_polyline(center: Pos2, radius: f32, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = (i as f32 / segments as f32) * std::f32::consts::TAU;
        points.push(Pos2::new(
            center.x + radius * t.cos(),
            center.y + radius * t.sin(),
        ));
    }
    points
}
