use foundation::math::Vec2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GestureKind {
    Mouse,
    SingleTouch,
    Pinch,
}

/// One pointer reading in client pixels, as delivered by the host.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerSample {
    Mouse(Vec2),
    Touch(Vec2),
    /// First two active touches.
    Pinch(Vec2, Vec2),
}

impl PointerSample {
    pub fn kind(&self) -> GestureKind {
        match self {
            PointerSample::Mouse(_) => GestureKind::Mouse,
            PointerSample::Touch(_) => GestureKind::SingleTouch,
            PointerSample::Pinch(_, _) => GestureKind::Pinch,
        }
    }

    /// The point used for rotation; the first finger of a pinch.
    pub fn primary(&self) -> Vec2 {
        match *self {
            PointerSample::Mouse(p) | PointerSample::Touch(p) | PointerSample::Pinch(p, _) => p,
        }
    }

    pub fn pinch_distance(&self) -> Option<f64> {
        match *self {
            PointerSample::Pinch(a, b) => Some(a.distance(b)),
            _ => None,
        }
    }
}

/// Live pointer interaction, created on press and discarded on release.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerGesture {
    pub kind: GestureKind,
    pub start_point: Vec2,
    pub last_point: Vec2,
    /// Finger distance the next pinch move is compared against.
    pub pinch_start_distance: Option<f64>,
}

impl PointerGesture {
    pub fn begin(sample: PointerSample) -> Self {
        let p = sample.primary();
        Self {
            kind: sample.kind(),
            start_point: p,
            last_point: p,
            pinch_start_distance: sample.pinch_distance(),
        }
    }

    /// Restarts the gesture from `sample` without producing any motion.
    pub fn rebaseline(&mut self, sample: PointerSample) {
        self.kind = sample.kind();
        self.last_point = sample.primary();
        self.pinch_start_distance = sample.pinch_distance();
    }
}

#[cfg(test)]
mod tests {
    use super::{GestureKind, PointerGesture, PointerSample};
    use foundation::math::Vec2;

    #[test]
    fn pinch_records_finger_distance() {
        let g = PointerGesture::begin(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 40.0),
        ));
        assert_eq!(g.kind, GestureKind::Pinch);
        assert_eq!(g.pinch_start_distance, Some(50.0));
        assert_eq!(g.start_point, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn single_touch_has_no_pinch_baseline() {
        let g = PointerGesture::begin(PointerSample::Touch(Vec2::new(5.0, 6.0)));
        assert_eq!(g.kind, GestureKind::SingleTouch);
        assert_eq!(g.pinch_start_distance, None);
    }

    #[test]
    fn rebaseline_switches_kind() {
        let mut g = PointerGesture::begin(PointerSample::Pinch(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
        ));
        g.rebaseline(PointerSample::Touch(Vec2::new(3.0, 3.0)));
        assert_eq!(g.kind, GestureKind::SingleTouch);
        assert_eq!(g.last_point, Vec2::new(3.0, 3.0));
        assert_eq!(g.pinch_start_distance, None);
    }
}
