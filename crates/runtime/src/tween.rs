//! Keyed interpolation tasks advanced once per frame.
//!
//! Key properties:
//! - At most one task per key: scheduling a key again replaces the pending
//!   task, so the last scheduled transition wins.
//! - Results are reported in scheduling order.
//! - A finished task reports its exact end value once and is dropped.

use foundation::color::Rgb;
use foundation::time::{Time, TimeSpan};

/// Values that can be interpolated by a [`TweenQueue`].
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl Lerp for Rgb {
    fn lerp(self, to: Self, t: f64) -> Self {
        Rgb::lerp(self, to, t as f32)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out.
    #[default]
    QuadOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

#[derive(Debug, Clone)]
struct Item<K, V> {
    key: K,
    from: V,
    to: V,
    span: TimeSpan,
    ease: Ease,
}

#[derive(Debug, Clone)]
pub struct TweenQueue<K, V> {
    items: Vec<Item<K, V>>,
}

impl<K, V> Default for TweenQueue<K, V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<K: Copy + PartialEq, V: Lerp> TweenQueue<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn schedule(&mut self, key: K, from: V, to: V, start: Time, duration_s: f64) {
        self.schedule_with_ease(key, from, to, start, duration_s, Ease::default())
    }

    pub fn schedule_with_ease(
        &mut self,
        key: K,
        from: V,
        to: V,
        start: Time,
        duration_s: f64,
        ease: Ease,
    ) {
        self.cancel(key);
        self.items.push(Item {
            key,
            from,
            to,
            span: TimeSpan::starting_at(start, duration_s),
            ease,
        });
    }

    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key != key);
        self.items.len() != before
    }

    pub fn is_active(&self, key: K) -> bool {
        self.items.iter().any(|item| item.key == key)
    }

    /// End value of the pending task for `key`.
    pub fn target(&self, key: K) -> Option<V> {
        self.items.iter().find(|item| item.key == key).map(|item| item.to)
    }

    /// Samples every task at `now`. Finished tasks are removed after
    /// reporting their end value.
    pub fn advance(&mut self, now: Time) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let t = item.span.progress(now);
            let value = if t >= 1.0 {
                item.to
            } else {
                item.from.lerp(item.to, item.ease.apply(t))
            };
            out.push((item.key, value));
        }
        self.items.retain(|item| item.span.progress(now) < 1.0);
        out
    }
}
