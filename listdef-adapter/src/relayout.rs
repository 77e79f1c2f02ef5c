/// Counters kept by a [`SerialQueue`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueStats {
    pub requested: u64,
    pub superseded: u64,
    pub flushed: u64,
}

/// A single-slot queue: at most one unit of work waits at a time.
///
/// A request made while another is pending replaces it (or merges with it). Nothing runs
/// on its own; the owner drains the slot with [`SerialQueue::take`] when it is ready.
#[derive(Clone, Debug)]
pub struct SerialQueue<T> {
    pending: Option<T>,
    stats: QueueStats,
}

impl<T> Default for SerialQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SerialQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: None,
            stats: QueueStats::default(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Queues `work`, returning the request it superseded.
    pub fn push(&mut self, work: T) -> Option<T> {
        self.stats.requested = self.stats.requested.saturating_add(1);
        let previous = self.pending.replace(work);
        if previous.is_some() {
            self.stats.superseded = self.stats.superseded.saturating_add(1);
            atrace!("pending work superseded");
        }
        previous
    }

    /// Queues `work`, combining it with the pending request through `merge(pending, work)`.
    pub fn push_merged(&mut self, work: T, merge: impl FnOnce(T, T) -> T) {
        self.stats.requested = self.stats.requested.saturating_add(1);
        let next = match self.pending.take() {
            Some(pending) => {
                self.stats.superseded = self.stats.superseded.saturating_add(1);
                merge(pending, work)
            }
            None => work,
        };
        self.pending = Some(next);
    }

    /// Removes the pending request, if any.
    pub fn take(&mut self) -> Option<T> {
        let work = self.pending.take()?;
        self.stats.flushed = self.stats.flushed.saturating_add(1);
        Some(work)
    }

    /// Drops the pending request without counting it as flushed.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take()
    }
}
