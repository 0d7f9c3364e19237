use foundation::time::Time;

/// One-shot timers keyed by `K`.
///
/// Scheduling a key that is already pending replaces its deadline, so only
/// the most recent request fires.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_order: u64,
    timers: Vec<(u64, K, Time)>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_order: 0,
            timers: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Arms `key` to fire at `due`. Returns `true` if an earlier timer for
    /// the same key was replaced.
    pub fn schedule(&mut self, key: K, due: Time) -> bool {
        let replaced = self.cancel(key);
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.timers.push((order, key, due));
        replaced
    }

    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|(_, k, _)| *k != key);
        self.timers.len() != before
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn deadline(&self, key: K) -> Option<Time> {
        self.timers
            .iter()
            .find(|(_, k, _)| *k == key)
            .map(|(_, _, due)| *due)
    }

    /// Removes and returns every key due at or before `now`, ordered by
    /// `(deadline, scheduling order)`.
    pub fn pop_due(&mut self, now: Time) -> Vec<K> {
        let mut due: Vec<(u64, K, Time)> = Vec::new();
        self.timers.retain(|entry| {
            if entry.2 .0 <= now.0 {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.2 .0
                .partial_cmp(&b.2 .0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        due.into_iter().map(|(_, key, _)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::TimerQueue;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule("late", Time(3.0));
        q.schedule("early", Time(1.0));
        assert!(q.pop_due(Time(0.5)).is_empty());
        assert_eq!(q.pop_due(Time(5.0)), vec!["early", "late"]);
        assert!(q.is_empty());
    }

    #[test]
    fn rescheduling_replaces_previous_deadline() {
        let mut q = TimerQueue::new();
        assert!(!q.schedule(1u32, Time(3.0)));
        assert!(q.schedule(1u32, Time(4.0)));
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(Time(3.5)).is_empty());
        assert_eq!(q.pop_due(Time(4.0)), vec![1]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut q = TimerQueue::new();
        q.schedule('a', Time(1.0));
        assert!(q.cancel('a'));
        assert_eq!(q.deadline('a'), None);
        assert!(q.pop_due(Time(2.0)).is_empty());
    }
}
