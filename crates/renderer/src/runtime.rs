use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames should animate continuously,
/// be evaluated at a fixed timestamp, or be exported to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Render continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Keep showing a single timestamp; redraw only on resize or pointer moves.
    Still {
        /// Timestamp to evaluate the program at (seconds).
        time: f32,
    },
    /// Render a frame and write the result to disk.
    Export {
        /// Timestamp to evaluate the program at (seconds).
        time: f32,
        /// Destination path for the exported file.
        path: PathBuf,
        /// Output format the user requested.
        format: ExportFormat,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// File formats supported by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
}

impl ExportFormat {
    /// Infers the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => Ok(ExportFormat::Png),
            None => bail!("export path has no extension; expected .png"),
            Some(other) => bail!("unsupported export format '.{other}'; expected .png"),
        }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } | RenderPolicy::Export { time, .. } => {
            Box::new(FixedTimeSource::new(*time))
        }
    }
}

/// Decides when the next frame is due.
///
/// Continuous schedulers fire every time (or once per interval when capped);
/// on-demand schedulers only fire after [`FrameScheduler::invalidate`].
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    continuous: bool,
    dirty: bool,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn for_policy(policy: &RenderPolicy) -> Self {
        match policy {
            RenderPolicy::Animate { target_fps } => Self {
                interval: target_fps
                    .filter(|fps| fps.is_finite() && *fps > 0.0)
                    .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
                continuous: true,
                dirty: true,
                last_frame: None,
            },
            RenderPolicy::Still { .. } | RenderPolicy::Export { .. } => Self {
                interval: None,
                continuous: false,
                dirty: true,
                last_frame: None,
            },
        }
    }

    /// Requests a redraw for on-demand schedulers.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if !self.continuous {
            return self.dirty;
        }
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.dirty = false;
    }

    /// When the next capped frame is due, if the scheduler is waiting on a timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.continuous {
            return None;
        }
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_repeats_timestamp_and_counts_frames() {
        let mut source = FixedTimeSource::new(2.5);
        assert_eq!(source.sample(), TimeSample::new(2.5, 0));
        assert_eq!(source.sample(), TimeSample::new(2.5, 1));
        source.reset();
        assert_eq!(source.sample().frame_index, 0);
    }

    #[test]
    fn system_source_is_monotonic() {
        let mut source = SystemTimeSource::new();
        let first = source.sample();
        let second = source.sample();
        assert!(second.seconds >= first.seconds);
        assert_eq!(second.frame_index, first.frame_index + 1);
    }

    #[test]
    fn export_format_follows_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/frame.PNG")).unwrap(),
            ExportFormat::Png
        );
        assert!(ExportFormat::from_path(Path::new("frame.exr")).is_err());
        assert!(ExportFormat::from_path(Path::new("frame")).is_err());
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::for_policy(&RenderPolicy::Animate {
            target_fps: Some(10.0),
        });
        let start = Instant::now();
        assert!(scheduler.ready_for_frame(start));
        scheduler.mark_rendered(start);
        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(100)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_millis(100))
        );
    }

    #[test]
    fn frame_interval_is_exact_for_common_caps() {
        for (fps, millis) in [(10.0, 100), (20.0, 50), (40.0, 25)] {
            let mut scheduler = FrameScheduler::for_policy(&RenderPolicy::Animate {
                target_fps: Some(fps),
            });
            let start = Instant::now();
            scheduler.mark_rendered(start);
            assert_eq!(
                scheduler.next_deadline(),
                Some(start + Duration::from_millis(millis))
            );
        }
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::for_policy(&RenderPolicy::default());
        let now = Instant::now();
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn still_scheduler_only_fires_when_invalidated() {
        let mut scheduler = FrameScheduler::for_policy(&RenderPolicy::Still { time: 1.0 });
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(!scheduler.ready_for_frame(now + Duration::from_secs(5)));
        scheduler.invalidate();
        assert!(scheduler.ready_for_frame(now));
    }
}
