//! Frame driver: one tick per host frame, renders throttled to an interval.
//!
//! The host calls [`FrameDriver::step`] with a monotonically increasing
//! timestamp once per display refresh. Every step runs exactly one tick;
//! a render is due only when the render interval has passed since the last
//! render. Several ticks can run between two renders and a render always
//! shows the latest tick.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use cytodrift::frame::FrameDriver;
//!
//! let mut driver = FrameDriver::new(Duration::from_millis(20));
//! assert!(driver.step(Duration::from_millis(1000)).render);
//! assert!(!driver.step(Duration::from_millis(1010)).render);
//! assert!(driver.step(Duration::from_millis(1021)).render);
//! assert_eq!(driver.ticks(), 3);
//! ```

use std::time::Duration;

/// What the host should do for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStep {
    /// Whether a render pass is due this frame.
    pub render: bool,
}

#[derive(Debug)]
pub struct FrameDriver {
    interval: Duration,
    start: Option<Duration>,
    last_step: Duration,
    elapsed: Duration,
    /// Render slot the next interval is measured from.
    last_render: Option<Duration>,
    tick_count: u64,
    render_count: u64,
    /// Renders per second (updated periodically).
    fps: f32,
    fps_render_count: u64,
    fps_update_time: Duration,
    fps_update_interval: Duration,
}

impl FrameDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            start: None,
            last_step: Duration::ZERO,
            elapsed: Duration::ZERO,
            last_render: None,
            tick_count: 0,
            render_count: 0,
            fps: 0.0,
            fps_render_count: 0,
            fps_update_time: Duration::ZERO,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to `timestamp`. A timestamp earlier than the previous one
    /// is treated as no time passing.
    pub fn step(&mut self, timestamp: Duration) -> FrameStep {
        let start = match self.start {
            Some(start) => start,
            None => {
                self.start = Some(timestamp);
                self.last_step = timestamp;
                self.fps_update_time = timestamp;
                timestamp
            }
        };
        let timestamp = timestamp.max(self.last_step);
        self.last_step = timestamp;
        self.elapsed = timestamp - start;
        self.tick_count += 1;

        let render = match self.last_render {
            None => true,
            Some(last) => timestamp - last >= self.interval,
        };
        if render {
            self.last_render = Some(match (self.last_render, self.interval.as_nanos()) {
                (Some(last), nanos) if nanos > 0 => {
                    // Snap to the interval grid.
                    let since = (timestamp - last).as_nanos();
                    timestamp - Duration::from_nanos((since % nanos) as u64)
                }
                _ => timestamp,
            });
            self.render_count += 1;
        }

        let fps_elapsed = timestamp - self.fps_update_time;
        if fps_elapsed >= self.fps_update_interval {
            let renders = self.render_count - self.fps_render_count;
            self.fps = renders as f32 / fps_elapsed.as_secs_f32();
            self.fps_render_count = self.render_count;
            self.fps_update_time = timestamp;
        }

        FrameStep { render }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time from the first step to the latest one.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total ticks since start.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    /// Total renders since start.
    #[inline]
    pub fn renders(&self) -> u64 {
        self.render_count
    }

    /// Calculated renders per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_first_step_renders() {
        let mut driver = FrameDriver::new(ms(16));
        let step = driver.step(ms(500));
        assert!(step.render);
        assert_eq!(driver.elapsed(), Duration::ZERO);
        assert_eq!(driver.ticks(), 1);
        assert_eq!(driver.renders(), 1);
    }

    #[test]
    fn test_fast_host_ticks_more_than_renders() {
        let mut driver = FrameDriver::new(ms(16));
        // 240 Hz host for one second.
        for i in 0..240 {
            driver.step(Duration::from_micros(i * 4167));
        }
        assert_eq!(driver.ticks(), 240);
        assert!(driver.renders() >= 55 && driver.renders() <= 63, "renders = {}", driver.renders());
    }

    #[test]
    fn test_late_frame_keeps_cadence() {
        let mut driver = FrameDriver::new(ms(10));
        driver.step(ms(0));
        assert!(driver.step(ms(13)).render);
        // Slot snapped to 10, so 20 is due again.
        assert!(driver.step(ms(20)).render);
        assert!(!driver.step(ms(25)).render);
    }

    #[test]
    fn test_backwards_timestamp_is_ignored() {
        let mut driver = FrameDriver::new(ms(10));
        driver.step(ms(100));
        let step = driver.step(ms(50));
        assert_eq!(driver.elapsed(), Duration::ZERO);
        assert!(!step.render);
        driver.step(ms(130));
        assert_eq!(driver.elapsed(), ms(30));
    }

    #[test]
    fn test_fps_updates() {
        let mut driver = FrameDriver::new(ms(10));
        for i in 0..=100 {
            driver.step(ms(i * 10));
        }
        assert!((driver.fps() - 100.0).abs() < 5.0, "fps = {}", driver.fps());
    }

    #[test]
    fn test_zero_interval_renders_every_step() {
        let mut driver = FrameDriver::new(Duration::ZERO);
        for i in 0..10 {
            assert!(driver.step(ms(i)).render);
        }
    }
}
