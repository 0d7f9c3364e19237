//! Orbit camera controller.
//!
//! The camera sits on a sphere around a fixed target. Pointer input only
//! accumulates pending rotation and zoom; [`OrbitController::recompute`]
//! applies them once per frame, clamps the result to the configured limits
//! and clears the pending deltas.

use foundation::math::{Spherical, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::gesture::{GestureKind, PointerGesture, PointerSample};

/// Multiplicative zoom step for one wheel notch or one pinch move.
pub const ZOOM_STEP: f64 = 0.95;

/// Rotation speed multiplier applied to mouse drags.
const DEFAULT_ROTATE_SPEED: f64 = 0.7;

/// Extra multiplier for single-finger drags.
const DEFAULT_TOUCH_ROTATE_FACTOR: f64 = 0.7;

/// Polar margin kept away from the zenith and the horizon.
const POLAR_MARGIN: f64 = 0.1;

/// Hard limits enforced by every [`OrbitController::recompute`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitLimits {
    pub min_distance: f64,
    pub max_distance: f64,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 5.0,
            max_distance: 30.0,
            min_polar_angle: POLAR_MARGIN,
            max_polar_angle: std::f64::consts::FRAC_PI_2 - POLAR_MARGIN,
        }
    }
}

impl OrbitLimits {
    /// Swaps inverted bounds so clamping is always well defined.
    pub fn normalized(self) -> Self {
        let (min_distance, max_distance) = if self.min_distance <= self.max_distance {
            (self.min_distance, self.max_distance)
        } else {
            (self.max_distance, self.min_distance)
        };
        let (min_polar_angle, max_polar_angle) = if self.min_polar_angle <= self.max_polar_angle {
            (self.min_polar_angle, self.max_polar_angle)
        } else {
            (self.max_polar_angle, self.min_polar_angle)
        };
        Self {
            min_distance: min_distance.max(0.0),
            max_distance: max_distance.max(0.0),
            min_polar_angle: min_polar_angle.clamp(0.0, std::f64::consts::PI),
            max_polar_angle: max_polar_angle.clamp(0.0, std::f64::consts::PI),
        }
    }
}

/// Damping settings. Pending deltas are applied in full and cleared by
/// every recompute, so `factor` is carried for hosts but not integrated.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Damping {
    pub enabled: bool,
    pub factor: f64,
}

impl Default for Damping {
    fn default() -> Self {
        Self {
            enabled: true,
            factor: 0.05,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub limits: OrbitLimits,
    pub damping: Damping,
    pub rotate_speed: f64,
    pub touch_rotate_factor: f64,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Initial camera position.
    pub position: Vec3,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            limits: OrbitLimits::default(),
            damping: Damping::default(),
            rotate_speed: DEFAULT_ROTATE_SPEED,
            touch_rotate_factor: DEFAULT_TOUCH_ROTATE_FACTOR,
            target: Vec3::new(0.0, 3.0, 0.0),
            position: Vec3::new(0.0, 5.0, 15.0),
        }
    }
}

/// Rotation waiting to be applied by the next recompute.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SphericalDelta {
    pub theta: f64,
    pub phi: f64,
}

/// Orbit controller state (the camera rig).
#[derive(Debug, Clone)]
pub struct OrbitController {
    /// Camera position in world space.
    pub position: Vec3,

    /// Orbit centre.
    pub target: Vec3,

    /// Spherical offset of `position` from `target` after the last recompute.
    pub spherical: Spherical,

    /// Pending rotation.
    pub spherical_delta: SphericalDelta,

    /// Pending radius multiplier.
    pub zoom_scale: f64,

    pub limits: OrbitLimits,
    pub damping: Damping,
    rotate_speed: f64,
    touch_rotate_factor: f64,

    /// Client size of the input surface in CSS pixels.
    viewport: Vec2,

    /// Active pointer interaction, if any.
    gesture: Option<PointerGesture>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}

impl OrbitController {
    pub fn new(config: OrbitConfig) -> Self {
        let mut controller = Self {
            position: config.position,
            target: config.target,
            spherical: Spherical::from_vec3(config.position - config.target),
            spherical_delta: SphericalDelta::default(),
            zoom_scale: 1.0,
            limits: config.limits.normalized(),
            damping: config.damping,
            rotate_speed: config.rotate_speed,
            touch_rotate_factor: config.touch_rotate_factor,
            viewport: Vec2::new(1280.0, 720.0),
            gesture: None,
        };
        controller.recompute();
        controller
    }

    /// Set the client size used to scale drag distances into angles.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn gesture(&self) -> Option<&PointerGesture> {
        self.gesture.as_ref()
    }

    pub fn is_interacting(&self) -> bool {
        self.gesture.is_some()
    }

    /// Handle pointer down / touch start.
    pub fn on_gesture_start(&mut self, sample: PointerSample) {
        self.gesture = Some(PointerGesture::begin(sample));
    }

    /// Handle pointer / touch move.
    ///
    /// Moves without an active gesture are ignored. A sample whose kind does
    /// not match the active gesture re-baselines it without moving the camera,
    /// except that a pinch sample turns a single touch into a pinch.
    pub fn on_gesture_move(&mut self, sample: PointerSample) {
        let Some(mut gesture) = self.gesture else {
            tracing::debug!(?sample, "pointer move without an active gesture");
            return;
        };

        match (gesture.kind, sample) {
            (GestureKind::Mouse, PointerSample::Mouse(p)) => {
                self.rotate_by(p - gesture.last_point, self.rotate_speed);
                gesture.last_point = p;
            }
            (GestureKind::SingleTouch, PointerSample::Touch(p)) => {
                self.rotate_by(
                    p - gesture.last_point,
                    self.rotate_speed * self.touch_rotate_factor,
                );
                gesture.last_point = p;
            }
            (GestureKind::Pinch, PointerSample::Pinch(a, b))
            | (GestureKind::SingleTouch, PointerSample::Pinch(a, b)) => {
                let distance = a.distance(b);
                match gesture.pinch_start_distance {
                    Some(start) if start > 0.0 => {
                        self.on_zoom_delta(if distance > start { -1.0 } else { 1.0 });
                    }
                    _ => {}
                }
                gesture.kind = GestureKind::Pinch;
                gesture.pinch_start_distance = Some(distance);
                gesture.last_point = a;
            }
            (kind, sample) => {
                tracing::debug!(?kind, ?sample, "gesture kind changed mid-move; re-baselining");
                gesture.rebaseline(sample);
            }
        }

        self.gesture = Some(gesture);
    }

    /// Handle pointer up / touch end. Always clears the gesture.
    pub fn on_gesture_end(&mut self) {
        self.gesture = None;
    }

    /// Queue one zoom step: a negative sign grows the radius by `1 / 0.95`,
    /// anything else shrinks it by `0.95`.
    pub fn on_zoom_delta(&mut self, sign: f64) {
        if sign < 0.0 {
            self.zoom_scale /= ZOOM_STEP;
        } else {
            self.zoom_scale *= ZOOM_STEP;
        }
    }

    /// Apply pending rotation and zoom, clamp to limits, reset pending state.
    pub fn recompute(&mut self) {
        let mut spherical = Spherical::from_vec3(self.position - self.target);

        spherical.theta += self.spherical_delta.theta;
        spherical.phi += self.spherical_delta.phi;

        spherical.phi = spherical
            .phi
            .clamp(self.limits.min_polar_angle, self.limits.max_polar_angle);
        spherical = spherical.make_safe();

        let scale = if self.zoom_scale.is_finite() && self.zoom_scale > 0.0 {
            self.zoom_scale
        } else {
            1.0
        };
        spherical.radius =
            (spherical.radius * scale).clamp(self.limits.min_distance, self.limits.max_distance);

        self.position = self.target + spherical.to_vec3();
        self.spherical = spherical;

        self.spherical_delta = SphericalDelta::default();
        self.zoom_scale = 1.0;
    }

    fn rotate_by(&mut self, delta_px: Vec2, speed: f64) {
        let h = self.viewport.y.max(1.0);
        self.spherical_delta.theta -= std::f64::consts::TAU * delta_px.x / h * speed;
        self.spherical_delta.phi -= std::f64::consts::TAU * delta_px.y / h * speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn controller() -> OrbitController {
        let mut c = OrbitController::default();
        c.set_viewport(800.0, 600.0);
        c
    }

    fn within_limits(c: &OrbitController) -> bool {
        let eps = 1e-9;
        c.spherical.phi >= c.limits.min_polar_angle - eps
            && c.spherical.phi <= c.limits.max_polar_angle + eps
            && c.spherical.radius >= c.limits.min_distance - eps
            && c.spherical.radius <= c.limits.max_distance + eps
    }

    #[test]
    fn default_rig_starts_inside_limits() {
        let c = controller();
        assert!(within_limits(&c));
        assert_eq!(c.target, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn mouse_drag_accumulates_until_recompute() {
        let mut c = controller();
        let before = c.position;
        c.on_gesture_start(PointerSample::Mouse(Vec2::new(100.0, 100.0)));
        c.on_gesture_move(PointerSample::Mouse(Vec2::new(160.0, 100.0)));

        let expected = -std::f64::consts::TAU * 60.0 / 600.0 * 0.7;
        assert!((c.spherical_delta.theta - expected).abs() < 1e-12);
        assert_eq!(c.position, before);

        c.recompute();
        assert_ne!(c.position, before);
        assert_eq!(c.spherical_delta, SphericalDelta::default());
        assert_eq!(c.zoom_scale, 1.0);
    }

    #[test]
    fn touch_drag_is_slower_than_mouse() {
        let mut mouse = controller();
        mouse.on_gesture_start(PointerSample::Mouse(Vec2::new(0.0, 0.0)));
        mouse.on_gesture_move(PointerSample::Mouse(Vec2::new(10.0, 0.0)));

        let mut touch = controller();
        touch.on_gesture_start(PointerSample::Touch(Vec2::new(0.0, 0.0)));
        touch.on_gesture_move(PointerSample::Touch(Vec2::new(10.0, 0.0)));

        let ratio = touch.spherical_delta.theta / mouse.spherical_delta.theta;
        assert!((ratio - 0.7).abs() < 1e-12);
    }

    #[test]
    fn pinch_spread_and_squeeze() {
        let mut c = controller();
        c.on_gesture_start(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        ));
        c.on_gesture_move(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(150.0, 0.0),
        ));
        assert!((c.zoom_scale - 1.0 / 0.95).abs() < 1e-12);

        let mut c = controller();
        c.on_gesture_start(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(150.0, 0.0),
        ));
        c.on_gesture_move(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        ));
        assert!((c.zoom_scale - 0.95).abs() < 1e-12);
    }

    #[test]
    fn pinch_rebaselines_after_each_move() {
        let mut c = controller();
        c.on_gesture_start(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
        ));
        c.on_gesture_move(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(150.0, 0.0),
        ));
        assert_eq!(c.gesture().and_then(|g| g.pinch_start_distance), Some(150.0));
    }

    #[test]
    fn pinch_without_baseline_only_records_it() {
        let mut c = controller();
        c.on_gesture_start(PointerSample::Touch(Vec2::new(0.0, 0.0)));
        c.on_gesture_move(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(80.0, 0.0),
        ));
        assert_eq!(c.zoom_scale, 1.0);
        assert_eq!(c.gesture().map(|g| g.kind), Some(GestureKind::Pinch));
        assert_eq!(c.gesture().and_then(|g| g.pinch_start_distance), Some(80.0));
    }

    #[test]
    fn pinch_to_single_touch_falls_back_without_jump() {
        let mut c = controller();
        c.on_gesture_start(PointerSample::Pinch(
            Vec2::new(10.0, 10.0),
            Vec2::new(100.0, 10.0),
        ));
        c.on_gesture_move(PointerSample::Touch(Vec2::new(300.0, 300.0)));
        assert_eq!(c.spherical_delta, SphericalDelta::default());
        assert_eq!(c.gesture().map(|g| g.kind), Some(GestureKind::SingleTouch));

        c.on_gesture_move(PointerSample::Touch(Vec2::new(310.0, 300.0)));
        assert!(c.spherical_delta.theta < 0.0);
    }

    #[test]
    fn moves_without_gesture_are_ignored() {
        let mut c = controller();
        c.on_gesture_move(PointerSample::Mouse(Vec2::new(50.0, 50.0)));
        assert_eq!(c.spherical_delta, SphericalDelta::default());
        assert!(!c.is_interacting());
    }

    #[test]
    fn release_clears_gesture() {
        let mut c = controller();
        c.on_gesture_start(PointerSample::Mouse(Vec2::new(0.0, 0.0)));
        c.on_gesture_end();
        c.on_gesture_move(PointerSample::Mouse(Vec2::new(500.0, 0.0)));
        assert_eq!(c.spherical_delta, SphericalDelta::default());
    }

    #[test]
    fn wheel_direction() {
        let mut c = controller();
        c.on_zoom_delta(-120.0);
        assert!((c.zoom_scale - 1.0 / 0.95).abs() < 1e-12);
        c.recompute();
        c.on_zoom_delta(120.0);
        assert!((c.zoom_scale - 0.95).abs() < 1e-12);
    }

    #[test]
    fn zoom_is_clamped_to_distance_limits() {
        let mut c = controller();
        for _ in 0..200 {
            c.on_zoom_delta(1.0);
        }
        c.recompute();
        assert!((c.spherical.radius - 5.0).abs() < 1e-9);

        for _ in 0..200 {
            c.on_zoom_delta(-1.0);
        }
        c.recompute();
        assert!((c.spherical.radius - 30.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_viewport_is_treated_as_one_pixel() {
        let mut c = controller();
        c.set_viewport(0.0, 0.0);
        c.on_gesture_start(PointerSample::Mouse(Vec2::new(0.0, 0.0)));
        c.on_gesture_move(PointerSample::Mouse(Vec2::new(1.0, 0.0)));
        assert!(c.spherical_delta.theta.is_finite());
        c.recompute();
        assert!(within_limits(&c));
    }

    #[test]
    fn zero_polar_limit_stays_off_the_pole() {
        let mut c = controller();
        c.limits.min_polar_angle = 0.0;
        c.on_gesture_start(PointerSample::Mouse(Vec2::new(400.0, 0.0)));
        c.on_gesture_move(PointerSample::Mouse(Vec2::new(400.0, 3000.0)));
        c.recompute();
        assert_eq!(c.spherical.phi, foundation::math::POLE_EPSILON);
        let offset = c.position - c.target;
        assert!(offset.x != 0.0 || offset.z != 0.0);
    }

    #[test]
    fn inverted_limits_are_normalized() {
        let limits = OrbitLimits {
            min_distance: 30.0,
            max_distance: 5.0,
            ..OrbitLimits::default()
        }
        .normalized();
        assert_eq!(limits.min_distance, 5.0);
        assert_eq!(limits.max_distance, 30.0);
    }

    #[derive(Debug, Clone)]
    enum Input {
        Drag(f64, f64),
        Wheel(f64),
        Recompute,
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(x, y)| Input::Drag(x, y)),
            (-500.0f64..500.0).prop_map(Input::Wheel),
            Just(Input::Recompute),
        ]
    }

    proptest! {
        #[test]
        fn recompute_always_lands_inside_limits(inputs in proptest::collection::vec(input(), 0..64)) {
            let mut c = controller();
            let mut cursor = Vec2::new(400.0, 300.0);
            c.on_gesture_start(PointerSample::Mouse(cursor));
            for i in inputs {
                match i {
                    Input::Drag(dx, dy) => {
                        cursor = cursor + Vec2::new(dx, dy);
                        c.on_gesture_move(PointerSample::Mouse(cursor));
                    }
                    Input::Wheel(d) => c.on_zoom_delta(d),
                    Input::Recompute => {
                        c.recompute();
                        prop_assert!(within_limits(&c));
                    }
                }
            }
            c.recompute();
            prop_assert!(within_limits(&c));
            prop_assert!((c.position - c.target).length() >= c.limits.min_distance - 1e-9);
        }
    }
}
