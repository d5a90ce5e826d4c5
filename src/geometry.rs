use egui::{Pos2, Rect};

use crate::circle::PctPoint;

/// Number labels sit just outside the circle at a fixed up-left angle.
pub const LABEL_ANGLE_DEG: f32 = -135.0;
pub const LABEL_OFFSET_PX: f32 = 12.0;

/// Resize-handle angle when there is no pointer history yet.
pub const DEFAULT_HANDLE_ANGLE_DEG: f32 = 45.0;

/// Maps a pointer position to percent space relative to the displayed image
/// rect. Returns `None` for a degenerate rect or a non-finite result; the
/// caller must treat that as "this event produced no position" and skip the
/// update rather than let NaN reach the store.
pub fn to_percent(pos: Pos2, image_rect: Rect) -> Option<PctPoint> {
    let width = image_rect.width();
    let height = image_rect.height();
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return None;
    }
    let x = (pos.x - image_rect.min.x) / width * 100.0;
    let y = (pos.y - image_rect.min.y) / height * 100.0;
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(PctPoint::new(x, y))
}

pub fn percent_to_screen(point: PctPoint, image_rect: Rect) -> Pos2 {
    Pos2::new(
        image_rect.min.x + point.x / 100.0 * image_rect.width(),
        image_rect.min.y + point.y / 100.0 * image_rect.height(),
    )
}

/// Pixel radius for a percent radius. The basis is the average of the
/// displayed width and height, fixed at render time.
pub fn radius_to_screen(r: f32, image_rect: Rect) -> f32 {
    r / 100.0 * (image_rect.width() + image_rect.height()) * 0.5
}

/// Angle from the circle center to the most recent pointer position, snapped
/// to the nearest diagonal quadrant so the resize handle follows the pointer's
/// general direction. Angles are y-up degrees.
pub fn handle_angle_deg(center: PctPoint, last_mouse: Option<PctPoint>) -> f32 {
    let Some(mouse) = last_mouse else {
        return DEFAULT_HANDLE_ANGLE_DEG;
    };
    let dx = mouse.x - center.x;
    let dy = mouse.y - center.y;
    let mut theta = (-dy).atan2(dx).to_degrees();
    if theta < 0.0 {
        theta += 360.0;
    }
    if theta < 90.0 {
        45.0
    } else if theta < 180.0 {
        135.0
    } else if theta < 270.0 {
        225.0
    } else {
        315.0
    }
}

/// Point on the circle boundary at a y-up angle, in percent space. Used for
/// both drawing the resize handle and hit-testing presses on it, so the two
/// can never disagree.
pub fn handle_anchor(center: PctPoint, r: f32, angle_deg: f32) -> PctPoint {
    let rad = angle_deg.to_radians();
    PctPoint::new(center.x + rad.cos() * r, center.y - rad.sin() * r)
}

/// Label position in pixel space: on the boundary plus `offset`, screen-angle
/// convention (y grows down, so a negative angle is up-left).
pub fn label_position(center: Pos2, r_px: f32, angle_deg: f32, offset: f32) -> Pos2 {
    let rad = angle_deg.to_radians();
    let label_r = r_px + offset;
    Pos2::new(center.x + rad.cos() * label_r, center.y + rad.sin() * label_r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, Rect};

    fn rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), egui::vec2(w, h))
    }

    #[test]
    fn to_percent_maps_corners_and_center() {
        let r = rect(800.0, 600.0);
        let origin = to_percent(pos2(100.0, 50.0), r).unwrap();
        assert_eq!((origin.x, origin.y), (0.0, 0.0));

        let center = to_percent(pos2(500.0, 350.0), r).unwrap();
        assert_eq!((center.x, center.y), (50.0, 50.0));

        let corner = to_percent(pos2(900.0, 650.0), r).unwrap();
        assert_eq!((corner.x, corner.y), (100.0, 100.0));
    }

    #[test]
    fn to_percent_rejects_degenerate_rects() {
        assert!(to_percent(pos2(10.0, 10.0), rect(0.0, 600.0)).is_none());
        assert!(to_percent(pos2(10.0, 10.0), rect(800.0, 0.0)).is_none());
        assert!(to_percent(pos2(10.0, 10.0), rect(-5.0, 600.0)).is_none());
        assert!(to_percent(pos2(f32::NAN, 10.0), rect(800.0, 600.0)).is_none());
    }

    #[test]
    fn round_trip_screen_and_percent() {
        let r = rect(640.0, 480.0);
        let p = PctPoint::new(25.0, 75.0);
        let back = to_percent(percent_to_screen(p, r), r).unwrap();
        assert!((back.x - p.x).abs() < 1e-4);
        assert!((back.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn handle_angle_defaults_and_snaps() {
        let center = PctPoint::new(50.0, 50.0);
        assert_eq!(handle_angle_deg(center, None), 45.0);

        // y grows down in percent space, so "above" means smaller y.
        let up_right = PctPoint::new(60.0, 40.0);
        assert_eq!(handle_angle_deg(center, Some(up_right)), 45.0);
        let up_left = PctPoint::new(40.0, 40.0);
        assert_eq!(handle_angle_deg(center, Some(up_left)), 135.0);
        let down_left = PctPoint::new(40.0, 60.0);
        assert_eq!(handle_angle_deg(center, Some(down_left)), 225.0);
        let down_right = PctPoint::new(60.0, 60.0);
        assert_eq!(handle_angle_deg(center, Some(down_right)), 315.0);
    }

    #[test]
    fn handle_anchor_sits_on_the_boundary() {
        let center = PctPoint::new(50.0, 50.0);
        let anchor = handle_anchor(center, 10.0, 45.0);
        assert!((center.distance(anchor) - 10.0).abs() < 1e-4);
        // 45 degrees y-up means up and to the right.
        assert!(anchor.x > center.x && anchor.y < center.y);
    }

    #[test]
    fn label_position_is_up_left_of_center() {
        let pos = label_position(pos2(400.0, 300.0), 50.0, LABEL_ANGLE_DEG, LABEL_OFFSET_PX);
        assert!(pos.x < 400.0 && pos.y < 300.0);
        let dist = ((pos.x - 400.0).powi(2) + (pos.y - 300.0).powi(2)).sqrt();
        assert!((dist - 62.0).abs() < 1e-3);
    }
}
