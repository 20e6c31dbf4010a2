//! Scroll-depth reporting
//!
//! Reports the first time scroll progress crosses each successive step
//! (25 percentage points by default), at most once per step per page load.
//!
//! Scroll events are coalesced: the first scroll while no frame is pending
//! requests an animation frame, later scrolls only refresh the cached
//! metrics, and the evaluation runs once when the frame arrives.
//!
//! ```text
//!   scroll ──► [idle] ──request_frame──► [ticking] ──frame──► evaluate ──► [idle]
//!                           scroll ──► (metrics refresh only) ──┘
//! ```

use storefront_platform::{DocumentMetrics, EventReporter, FrameScheduler};
use tracing::{info, trace};

use crate::analytics;

/// Highest threshold; nothing is reported after it
pub const MAX_THRESHOLD: u32 = 100;

/// Per-page scroll state
///
/// `last_reported_threshold` only ever grows; the cached heights are
/// refreshed on resize and alongside scroll events so the evaluation itself
/// never queries layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollProgress {
    last_reported_threshold: u32,
    document_height: f64,
    viewport_height: f64,
}

impl ScrollProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_reported_threshold(&self) -> u32 {
        self.last_reported_threshold
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Re-read document and viewport heights from the host
    pub fn refresh<M: DocumentMetrics + ?Sized>(&mut self, metrics: &M) {
        self.set_metrics(metrics.document_height(), metrics.viewport_height());
    }

    pub fn set_metrics(&mut self, document_height: f64, viewport_height: f64) {
        self.document_height = document_height;
        self.viewport_height = viewport_height;
    }

    /// Scrollable distance, never below 1 so short pages cannot divide by zero
    pub fn scrollable_range(&self) -> f64 {
        (self.document_height - self.viewport_height).max(1.0)
    }

    /// Scroll progress in percent for the given offset
    pub fn progress(&self, scroll_y: f64) -> f64 {
        scroll_y / self.scrollable_range() * 100.0
    }

    /// Whether the final threshold has been reported
    pub fn is_complete(&self) -> bool {
        self.last_reported_threshold >= MAX_THRESHOLD
    }

    /// Record the threshold crossed at `scroll_y`, if any.
    ///
    /// A threshold counts as crossed only when progress strictly exceeds the
    /// last reported one plus `step`; landing exactly on the boundary does
    /// not report.
    pub fn evaluate(&mut self, scroll_y: f64, step: u32) -> Option<u32> {
        if self.is_complete() || step == 0 {
            return None;
        }

        let progress = self.progress(scroll_y);
        let next = self.last_reported_threshold + step;
        // Written as a negated `>` so NaN never counts as crossing
        if !(progress > f64::from(next)) {
            return None;
        }

        let steps = (progress / f64::from(step)).floor() as u32;
        let crossed = steps.saturating_mul(step).min(MAX_THRESHOLD);
        self.last_reported_threshold = crossed;
        Some(crossed)
    }
}

/// Throttled scroll-depth reporter driven by scroll, resize and frame events
#[derive(Clone, Debug)]
pub struct ScrollDepthReporter {
    progress: ScrollProgress,
    step: u32,
    ticking: bool,
}

impl Default for ScrollDepthReporter {
    fn default() -> Self {
        Self::new(25)
    }
}

impl ScrollDepthReporter {
    pub fn new(step: u32) -> Self {
        Self {
            progress: ScrollProgress::new(),
            step,
            ticking: false,
        }
    }

    pub fn progress(&self) -> &ScrollProgress {
        &self.progress
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Whether an evaluation is waiting for its animation frame
    pub fn is_frame_pending(&self) -> bool {
        self.ticking
    }

    /// Refresh cached metrics (page load, resize)
    pub fn on_resize<M: DocumentMetrics + ?Sized>(&mut self, metrics: &M) {
        self.progress.refresh(metrics);
    }

    /// Handle a scroll event: request a frame unless one is already pending
    pub fn on_scroll<H: DocumentMetrics + FrameScheduler + ?Sized>(&mut self, host: &mut H) {
        if !self.ticking {
            self.ticking = true;
            host.request_frame();
        }
        self.progress.refresh(&*host);
    }

    /// Run the deferred evaluation; returns the newly reported threshold
    pub fn on_animation_frame<H: DocumentMetrics + EventReporter + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Option<u32> {
        if !self.ticking {
            return None;
        }
        self.ticking = false;

        let scroll_y = host.scroll_y();
        trace!(
            scroll_y,
            range = self.progress.scrollable_range(),
            last = self.progress.last_reported_threshold(),
            "evaluating scroll depth"
        );

        let crossed = self.progress.evaluate(scroll_y, self.step)?;
        info!(threshold = crossed, "scroll depth reached");
        host.report(&analytics::scroll_depth(crossed));
        Some(crossed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_platform::headless::HeadlessHost;

    fn labels(host: &HeadlessHost) -> Vec<String> {
        host.reported().iter().map(|e| e.label.clone()).collect()
    }

    /// Scroll to `y` and let the pending frame run
    fn scroll_and_frame(reporter: &mut ScrollDepthReporter, host: &mut HeadlessHost, y: f64) {
        host.scroll_to(y);
        reporter.on_scroll(host);
        while host.take_frame_request() {
            reporter.on_animation_frame(host);
        }
    }

    #[test]
    fn test_reference_scenario() {
        let mut host = HeadlessHost::new();
        host.set_metrics(2000.0, 1000.0);
        let mut reporter = ScrollDepthReporter::default();

        scroll_and_frame(&mut reporter, &mut host, 0.0);
        assert!(host.reported().is_empty());

        scroll_and_frame(&mut reporter, &mut host, 300.0);
        assert_eq!(labels(&host), vec!["25%"]);
        let event = &host.reported()[0];
        assert_eq!(event.name, "scroll_depth");
        assert_eq!(event.category, "Engagement");

        // Scrolling back up never re-reports
        scroll_and_frame(&mut reporter, &mut host, 260.0);
        assert_eq!(labels(&host), vec!["25%"]);

        scroll_and_frame(&mut reporter, &mut host, 600.0);
        assert_eq!(labels(&host), vec!["25%", "50%"]);
    }

    #[test]
    fn test_monotonic_progress_reports_each_threshold_once() {
        let mut host = HeadlessHost::new();
        host.set_metrics(1100.0, 100.0);
        let mut reporter = ScrollDepthReporter::default();

        for y in (0..=1000).step_by(7) {
            scroll_and_frame(&mut reporter, &mut host, f64::from(y));
        }
        scroll_and_frame(&mut reporter, &mut host, 1000.0);

        let reported: Vec<u32> = labels(&host)
            .iter()
            .map(|l| l.trim_end_matches('%').parse().unwrap())
            .collect();
        assert!(reported.windows(2).all(|w| w[0] < w[1]));
        assert!(reported.iter().all(|t| [25, 50, 75, 100].contains(t)));
        // The bottom of the page is exactly 100%, which does not exceed 75 + 25
        assert_eq!(reported, vec![25, 50, 75]);
    }

    #[test]
    fn test_no_report_below_first_threshold() {
        let mut host = HeadlessHost::new();
        host.set_metrics(2000.0, 1000.0);
        let mut reporter = ScrollDepthReporter::default();

        for y in [10.0, 120.0, 249.0, 250.0, 0.0, 250.0] {
            scroll_and_frame(&mut reporter, &mut host, y);
        }
        assert!(host.reported().is_empty());
        assert_eq!(reporter.progress().last_reported_threshold(), 0);
    }

    #[test]
    fn test_exact_boundary_does_not_report() {
        let mut progress = ScrollProgress::new();
        progress.set_metrics(2000.0, 1000.0);

        assert_eq!(progress.evaluate(250.0, 25), None);
        assert_eq!(progress.evaluate(251.0, 25), Some(25));
        assert_eq!(progress.evaluate(500.0, 25), None);
        assert_eq!(progress.evaluate(500.5, 25), Some(50));
    }

    #[test]
    fn test_jump_skips_to_highest_crossed_threshold() {
        let mut progress = ScrollProgress::new();
        progress.set_metrics(2000.0, 1000.0);

        assert_eq!(progress.evaluate(800.0, 25), Some(75));
        assert_eq!(progress.evaluate(760.0, 25), None);
        assert_eq!(progress.evaluate(1000.0, 25), None);
    }

    #[test]
    fn test_no_scrollable_range() {
        let mut progress = ScrollProgress::new();
        progress.set_metrics(800.0, 800.0);
        assert_eq!(progress.scrollable_range(), 1.0);
        assert_eq!(progress.progress(0.0), 0.0);

        // Content shorter than the viewport clamps too
        progress.set_metrics(500.0, 800.0);
        assert_eq!(progress.scrollable_range(), 1.0);
        assert!(progress.progress(0.0).is_finite());
    }

    #[test]
    fn test_terminal_threshold() {
        let mut progress = ScrollProgress::new();
        progress.set_metrics(800.0, 800.0);

        assert_eq!(progress.evaluate(5.0, 25), Some(MAX_THRESHOLD));
        assert!(progress.is_complete());
        assert_eq!(progress.evaluate(50.0, 25), None);
    }

    #[test]
    fn test_scroll_events_coalesce_into_one_frame() {
        let mut host = HeadlessHost::new();
        host.set_metrics(2000.0, 1000.0);
        let mut reporter = ScrollDepthReporter::default();

        for y in [100.0, 200.0, 300.0, 400.0] {
            host.scroll_to(y);
            reporter.on_scroll(&mut host);
        }
        assert_eq!(host.pending_frames(), 1);
        assert!(reporter.is_frame_pending());

        assert!(host.take_frame_request());
        assert_eq!(reporter.on_animation_frame(&mut host), Some(25));
        assert!(!reporter.is_frame_pending());

        // Next scroll schedules a fresh frame
        reporter.on_scroll(&mut host);
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn test_spurious_frame_is_ignored() {
        let mut host = HeadlessHost::new();
        host.set_metrics(2000.0, 1000.0);
        host.scroll_to(900.0);
        let mut reporter = ScrollDepthReporter::default();

        assert_eq!(reporter.on_animation_frame(&mut host), None);
        assert!(host.reported().is_empty());
    }

    #[test]
    fn test_metrics_cached_until_resize_or_scroll() {
        let mut host = HeadlessHost::new();
        host.set_metrics(2000.0, 1000.0);
        let mut reporter = ScrollDepthReporter::default();
        reporter.on_resize(&host);

        // Layout changes are not observed by the frame itself
        host.set_metrics(5000.0, 1000.0);
        assert_eq!(reporter.progress().document_height(), 2000.0);

        reporter.on_resize(&host);
        assert_eq!(reporter.progress().document_height(), 5000.0);

        host.set_metrics(3000.0, 500.0);
        reporter.on_scroll(&mut host);
        assert_eq!(reporter.progress().document_height(), 3000.0);
        assert_eq!(reporter.progress().viewport_height(), 500.0);
    }

    #[test]
    fn test_missing_transport_is_silent() {
        let mut host = HeadlessHost::new();
        host.disable_transport();
        host.set_metrics(2000.0, 1000.0);
        let mut reporter = ScrollDepthReporter::default();

        scroll_and_frame(&mut reporter, &mut host, 600.0);
        assert!(host.reported().is_empty());
        assert_eq!(reporter.progress().last_reported_threshold(), 50);
    }

    #[test]
    fn test_custom_step() {
        let mut progress = ScrollProgress::new();
        progress.set_metrics(1100.0, 100.0);
        assert_eq!(progress.evaluate(110.0, 10), Some(10));
        assert_eq!(progress.evaluate(350.0, 10), Some(30));
    }
}
