use foundation::time::Time;

/// Frame metadata handed to every scheduled job.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Elapsed time since the clock started (seconds).
    pub time: Time,
}

impl Frame {
    /// Fixed-timestep frame, used for replay and tests.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

/// Turns host timestamps (e.g. `requestAnimationFrame` milliseconds) into
/// frames measured from the first sample.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    origin_s: Option<f64>,
    last_s: f64,
    index: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the clock. Timestamps that go backwards yield a zero `dt_s`.
    pub fn tick(&mut self, now_s: f64) -> Frame {
        let origin = *self.origin_s.get_or_insert(now_s);
        let elapsed = (now_s - origin).max(self.last_s);
        let frame = Frame {
            index: self.index,
            dt_s: elapsed - self.last_s,
            time: Time(elapsed),
        };
        self.last_s = elapsed;
        self.index += 1;
        frame
    }
}
