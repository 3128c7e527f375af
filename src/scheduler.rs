use std::time::Instant;

/// Identifies one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn new(id: u64) -> Self {
        TickHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Display-refresh style scheduling: a tick requested now fires on the next
/// frame, and the frame loop hands ready ticks back to whoever asked for them.
pub trait Scheduler {
    /// Current time in milliseconds
    fn now(&self) -> f64;

    /// Request a callback on the next frame
    fn schedule_tick(&mut self) -> TickHandle;

    /// Drop a pending callback. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);

    /// Remove and return every tick due on this frame, in scheduling order
    fn take_ready(&mut self) -> Vec<TickHandle>;
}

/// Scheduler driven by the real clock, for interactive front ends
#[derive(Debug)]
pub struct FrameScheduler {
    origin: Instant,
    next_id: u64,
    pending: Vec<TickHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        FrameScheduler {
            origin: Instant::now(),
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FrameScheduler {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|h| *h != handle);
    }

    fn take_ready(&mut self) -> Vec<TickHandle> {
        std::mem::take(&mut self.pending)
    }
}

/// Scheduler on virtual time. Nothing moves until `advance` is called, which
/// makes animation tests deterministic.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: f64,
    next_id: u64,
    pending: Vec<TickHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the virtual clock at a given time
    pub fn starting_at(now: f64) -> Self {
        ManualScheduler {
            now,
            ..Self::default()
        }
    }

    /// Move virtual time forward by `ms` milliseconds
    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Number of callbacks still waiting to fire
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now
    }

    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.pending.retain(|h| *h != handle);
    }

    fn take_ready(&mut self) -> Vec<TickHandle> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_handles_are_unique() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule_tick();
        let b = scheduler.schedule_tick();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count(), 2);
    }

    #[test]
    fn test_cancel_removes_pending_tick() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule_tick();
        let b = scheduler.schedule_tick();
        scheduler.cancel(a);
        scheduler.cancel(TickHandle::new(999));
        assert_eq!(scheduler.take_ready(), vec![b]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_virtual_time() {
        let mut scheduler = ManualScheduler::starting_at(100.0);
        scheduler.advance(250.0);
        assert_eq!(scheduler.now(), 350.0);
    }
}
