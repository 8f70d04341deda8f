/// Delay-ordered queue of timed events, counted in frames.
///
/// Pending entries are kept sorted by remaining delay. Ties keep insertion
/// order, so two events enqueued with the same delay always fire in the
/// order they were enqueued.
///
/// `tick()` is two-phase:
///   1. drain and fire every entry whose delay is 0, front to back;
///   2. decrement every remaining delay by one.
///
/// Events enqueued by a handler during phase 1 are held aside and only
/// join the queue before phase 2, so they are never fired in the tick that
/// created them and they age by one frame like everything else.

#[derive(Debug)]
struct Scheduled<E> {
    delay: u32,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    pending: Vec<Scheduled<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Scheduler { pending: Vec::new() }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` to fire after `delay` ticks.
    pub fn enqueue(&mut self, delay: u32, event: E) {
        let at = self.pending.partition_point(|s| s.delay <= delay);
        self.pending.insert(at, Scheduled { delay, event });
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remaining delays in firing order.
    #[cfg(test)]
    fn delays(&self) -> Vec<u32> {
        self.pending.iter().map(|s| s.delay).collect()
    }

    /// `(delay, event)` pairs in firing order.
    #[cfg(test)]
    pub(crate) fn entries(&self) -> Vec<(u32, E)>
    where
        E: Clone,
    {
        self.pending.iter().map(|s| (s.delay, s.event.clone())).collect()
    }

    /// Fire due events, then age the rest.
    ///
    /// `fire` receives each due event and a buffer for follow-up events
    /// `(delay, event)`. Returns the number of events fired.
    pub fn tick<F>(&mut self, mut fire: F) -> usize
    where
        F: FnMut(E, &mut Vec<(u32, E)>),
    {
        let due = self.pending.partition_point(|s| s.delay == 0);
        let mut later = Vec::new();
        for s in self.pending.drain(..due) {
            fire(s.event, &mut later);
        }

        for (delay, event) in later {
            self.enqueue(delay, event);
        }
        for s in &mut self.pending {
            s.delay = s.delay.saturating_sub(1);
        }
        due
    }
}
