//! Frame-coalesced re-layout scheduling.
//!
//! Resize and slot changes never classify synchronously. They request a pass
//! on the next animation frame through [`FrameScheduler`], a small state
//! machine:
//!
//! ```text
//! Idle ──request──▶ Scheduled ──frame──▶ Running ──finish──▶ Settling ──frame──▶ Idle
//!                     │  ▲
//!                     └──┘ request: previous ticket cancelled, new ticket issued
//! ```
//!
//! While `Running` or `Settling` the re-entrancy guard is held: resize
//! observations are dropped (they are usually echoes of the pass itself) and
//! structural triggers are deferred until the guard is released.

use tracing::trace;

/// What caused a layout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutTrigger {
    Mount,
    SlotChanged,
    Resize,
    FeatureEnabled,
}

impl LayoutTrigger {
    /// Resize observations can be caused by applying a pass; structural
    /// triggers cannot.
    fn is_observer_echo(self) -> bool {
        matches!(self, LayoutTrigger::Resize)
    }
}

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    #[default]
    Idle,
    Scheduled { ticket: u64 },
    Running,
    Settling,
}

/// Counters for scheduler activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub scheduled: u64,
    pub cancelled: u64,
    pub executed: u64,
    pub suppressed: u64,
}

/// One-shot "next animation frame" scheduler with a re-entrancy guard.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    phase: FramePhase,
    next_ticket: u64,
    deferred: bool,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn is_idle(&self) -> bool {
        self.phase == FramePhase::Idle
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.phase, FramePhase::Scheduled { .. })
    }

    /// Requests a pass on the next frame. Returns `true` when a ticket is
    /// pending afterwards because of this call.
    pub fn request(&mut self, trigger: LayoutTrigger) -> bool {
        match self.phase {
            FramePhase::Idle => {
                self.issue_ticket();
                true
            }
            FramePhase::Scheduled { ticket } => {
                trace!(ticket, ?trigger, "coalescing layout request into next frame");
                self.stats.cancelled += 1;
                self.issue_ticket();
                true
            }
            FramePhase::Running | FramePhase::Settling => {
                if trigger.is_observer_echo() {
                    trace!(?trigger, phase = ?self.phase, "layout guard held; dropping observer echo");
                    self.stats.suppressed += 1;
                } else {
                    trace!(?trigger, phase = ?self.phase, "layout guard held; deferring trigger");
                    self.deferred = true;
                }
                false
            }
        }
    }

    /// Advances on an animation frame. Returns `true` when a pass must run now;
    /// the caller must follow with [`FrameScheduler::finish_pass`].
    pub fn begin_frame(&mut self) -> bool {
        match self.phase {
            FramePhase::Idle => false,
            FramePhase::Scheduled { .. } => {
                self.phase = FramePhase::Running;
                true
            }
            FramePhase::Running => false,
            FramePhase::Settling => {
                self.phase = FramePhase::Idle;
                if std::mem::take(&mut self.deferred) {
                    self.issue_ticket();
                }
                false
            }
        }
    }

    /// Marks the running pass complete; the guard stays held until the next frame.
    pub fn finish_pass(&mut self) {
        if self.phase == FramePhase::Running {
            self.stats.executed += 1;
            self.phase = FramePhase::Settling;
        }
    }

    /// Drops any pending ticket and the guard, e.g. on unmount.
    pub fn reset(&mut self) {
        if self.is_scheduled() {
            self.stats.cancelled += 1;
        }
        self.phase = FramePhase::Idle;
        self.deferred = false;
    }

    fn issue_ticket(&mut self) {
        self.next_ticket += 1;
        self.stats.scheduled += 1;
        self.phase = FramePhase::Scheduled { ticket: self.next_ticket };
    }
}

/// Detects container resizes and item set changes and decides when a
/// classification pass must run.
#[derive(Debug, Default)]
pub struct LayoutMonitor {
    scheduler: FrameScheduler,
    /// Container width used by the last completed pass.
    classified_width: Option<u16>,
    /// Set when items changed or a pass was skipped; cleared by a completed pass.
    stale: bool,
}

impl LayoutMonitor {
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn classified_width(&self) -> Option<u16> {
        self.classified_width
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn notify_mounted(&mut self) {
        self.stale = true;
        self.scheduler.request(LayoutTrigger::Mount);
    }

    pub fn notify_items_changed(&mut self) {
        self.stale = true;
        self.scheduler.request(LayoutTrigger::SlotChanged);
    }

    pub fn notify_feature_enabled(&mut self) {
        self.stale = true;
        self.scheduler.request(LayoutTrigger::FeatureEnabled);
    }

    /// Records the container width seen by the renderer. A width differing
    /// from the last classified one, or any width while stale, requests a pass.
    /// A detached container (`None`) never triggers.
    pub fn observe_container(&mut self, width: Option<u16>) {
        let Some(width) = width else {
            return;
        };
        let resized = self.classified_width != Some(width);
        if (resized || self.stale) && self.scheduler.is_idle() {
            trace!(width, previous = ?self.classified_width, "container change observed");
            self.scheduler.request(LayoutTrigger::Resize);
        }
    }

    /// Runs `pass` if a frame is due. `pass` returns the container width it
    /// classified against, or `None` when it had to skip (detached).
    pub fn on_frame<F>(&mut self, pass: F) -> bool
    where
        F: FnOnce() -> Option<u16>,
    {
        if !self.scheduler.begin_frame() {
            return false;
        }
        match pass() {
            Some(width) => {
                self.classified_width = Some(width);
                self.stale = false;
            }
            None => self.stale = true,
        }
        self.scheduler.finish_pass();
        true
    }

    /// Forgets scheduling state; the next mount starts fresh.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.classified_width = None;
        self.stale = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_requests_coalesce_into_one_pass() {
        let mut scheduler = FrameScheduler::default();
        assert!(scheduler.request(LayoutTrigger::Resize));
        assert!(scheduler.request(LayoutTrigger::Resize));
        assert!(scheduler.request(LayoutTrigger::SlotChanged));
        assert_eq!(scheduler.phase(), FramePhase::Scheduled { ticket: 3 });
        assert_eq!(scheduler.stats().cancelled, 2);

        assert!(scheduler.begin_frame());
        scheduler.finish_pass();
        assert_eq!(scheduler.phase(), FramePhase::Settling);
        assert!(!scheduler.begin_frame());
        assert!(scheduler.is_idle());
        assert!(!scheduler.begin_frame());
        assert_eq!(scheduler.stats().executed, 1);
    }

    #[test]
    fn guard_drops_echoes_and_defers_structural_triggers() {
        let mut scheduler = FrameScheduler::default();
        scheduler.request(LayoutTrigger::Mount);
        assert!(scheduler.begin_frame());
        assert!(!scheduler.request(LayoutTrigger::Resize));
        scheduler.finish_pass();
        assert!(!scheduler.request(LayoutTrigger::Resize));
        assert_eq!(scheduler.stats().suppressed, 2);
        assert!(!scheduler.request(LayoutTrigger::SlotChanged));

        // Guard released on the following frame; deferred trigger is scheduled.
        assert!(!scheduler.begin_frame());
        assert!(scheduler.is_scheduled());
        assert!(scheduler.begin_frame());
    }

    #[test]
    fn monitor_runs_pass_only_when_due() {
        let mut monitor = LayoutMonitor::default();
        let mut runs = 0;
        assert!(!monitor.on_frame(|| {
            runs += 1;
            Some(80)
        }));

        monitor.notify_mounted();
        monitor.observe_container(Some(80));
        assert!(monitor.on_frame(|| {
            runs += 1;
            Some(80)
        }));
        assert_eq!(runs, 1);
        assert_eq!(monitor.classified_width(), Some(80));

        // Same width while settling and afterwards: nothing new to do.
        monitor.observe_container(Some(80));
        monitor.on_frame(|| Some(80));
        monitor.observe_container(Some(80));
        assert!(monitor.scheduler().is_idle());
    }

    #[test]
    fn resize_is_detected_after_guard_release() {
        let mut monitor = LayoutMonitor::default();
        monitor.notify_mounted();
        monitor.on_frame(|| Some(80));
        // Echo during settling is ignored but re-detected once idle.
        monitor.observe_container(Some(60));
        assert!(!monitor.scheduler().is_scheduled());
        monitor.on_frame(|| Some(60));
        monitor.observe_container(Some(60));
        assert!(monitor.scheduler().is_scheduled());
    }

    #[test]
    fn skipped_pass_resumes_on_next_trigger() {
        let mut monitor = LayoutMonitor::default();
        monitor.notify_items_changed();
        assert!(monitor.on_frame(|| None));
        assert!(monitor.is_stale());
        assert_eq!(monitor.classified_width(), None);

        monitor.on_frame(|| None);
        monitor.observe_container(None);
        assert!(monitor.scheduler().is_idle());

        monitor.observe_container(Some(40));
        assert!(monitor.on_frame(|| Some(40)));
        assert!(!monitor.is_stale());
    }
}
