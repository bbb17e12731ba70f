//! Pointer input sanitizing and launch math

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pointer coordinates that cannot enter the simulation
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("non-finite pointer position ({x}, {y})")]
pub struct InputRejected {
    pub x: f32,
    pub y: f32,
}

/// Raw pointer events, in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerInput {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

pub fn sanitize(x: f32, y: f32) -> Result<Vec2, InputRejected> {
    let point = Vec2::new(x, y);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(InputRejected { x, y })
    }
}

/// Projectile position for a pointer, at most `max_distance` from the anchor
pub fn clamp_drag(anchor: Vec2, pointer: Vec2, max_distance: f32) -> Vec2 {
    let offset = pointer - anchor;
    // Scale first so far-off pointers do not overflow the length
    let scale = offset.abs().max_element();
    if scale == 0.0 || !scale.is_finite() {
        return anchor;
    }
    let unit = offset / scale;
    let distance = scale * unit.length();
    if distance <= max_distance {
        pointer
    } else {
        anchor + unit.normalize_or_zero() * max_distance
    }
}

/// Reverse-pull catapult: fires from the drag point back through the anchor
pub fn launch_velocity(anchor: Vec2, drag_pos: Vec2, force: f32) -> Vec2 {
    (anchor - drag_pos) * force
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_rejected() {
        assert!(sanitize(f32::NAN, 1.0).is_err());
        assert!(sanitize(1.0, f32::INFINITY).is_err());
        assert_eq!(sanitize(3.0, 4.0), Ok(Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_clamp_drag_limits_radius() {
        let anchor = Vec2::new(100.0, 100.0);
        let far = clamp_drag(anchor, Vec2::new(100.0, 10_000.0), 160.0);
        assert!((far - Vec2::new(100.0, 260.0)).length() < 1e-3);

        let near = clamp_drag(anchor, Vec2::new(110.0, 100.0), 160.0);
        assert_eq!(near, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_clamp_drag_huge_but_finite() {
        let anchor = Vec2::new(0.0, 0.0);
        let p = clamp_drag(anchor, Vec2::new(1.0e30, -1.0e30), 160.0);
        assert!(p.is_finite());
        assert!(p.length() <= 160.0 + 1e-3);
    }

    #[test]
    fn test_launch_is_reverse_pull() {
        let v = launch_velocity(Vec2::new(200.0, 600.0), Vec2::new(200.0, 700.0), 0.25);
        assert_eq!(v, Vec2::new(0.0, -25.0));
    }
}
