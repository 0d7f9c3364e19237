use crate::frame::Frame;
use crate::job::Job;

/// Runs registered jobs once per frame in a fixed order.
pub struct Scheduler<C> {
    next_order: u64,
    jobs: Vec<(u64, Job<C>)>,
    sorted: bool,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self {
            next_order: 0,
            jobs: Vec::new(),
            sorted: true,
        }
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_job(&mut self, job: Job<C>) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        tracing::debug!(job = job.id, priority = job.priority, "registered frame job");
        self.jobs.push((order, job));
        self.sorted = false;
    }

    /// Job ids in execution order.
    pub fn order(&mut self) -> Vec<&'static str> {
        self.sort();
        self.jobs.iter().map(|(_, job)| job.id).collect()
    }

    /// Run all jobs for the given frame.
    ///
    /// Ordering is deterministic: `(priority, id, insertion_order)`.
    pub fn run_frame(&mut self, ctx: &mut C, frame: Frame) {
        self.sort();
        for (_order, job) in &self.jobs {
            (job.run)(ctx, frame);
        }
    }

    fn sort(&mut self) {
        if self.sorted {
            return;
        }
        // Total ordering: (priority, id, insertion_order). This stays deterministic even if
        // callers accidentally register duplicate job ids.
        self.jobs.sort_by(|(oa, a), (ob, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.id.cmp(b.id))
                .then_with(|| oa.cmp(ob))
        });
        self.sorted = true;
    }
}
