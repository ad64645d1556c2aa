//! Frame scheduling independent of the host's refresh mechanism.

use std::time::{Duration, Instant};

/// Timing of a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Zero-based frame number
    pub frame: u64,

    /// Time since the first frame
    pub elapsed: Duration,

    /// Time since the previous frame (zero on the first frame)
    pub delta: Duration,
}

impl FrameTime {
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// How the driver advances time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Elapsed time follows the wall clock
    RealTime,

    /// Every tick advances by exactly `step` (recording)
    Fixed { step: Duration },
}

/// Something updated then rendered once per tick
pub trait Scene {
    type Error;

    fn update(&mut self, time: FrameTime);

    fn render(&mut self, time: FrameTime) -> Result<(), Self::Error>;
}

/// Invokes `update` then `render` on a scene each tick
#[derive(Debug, Clone)]
pub struct FrameDriver {
    pacing: Pacing,
    start: Option<Instant>,
    last: Duration,
    frame: u64,
}

impl FrameDriver {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            start: None,
            last: Duration::ZERO,
            frame: 0,
        }
    }

    pub fn real_time() -> Self {
        Self::new(Pacing::RealTime)
    }

    pub fn fixed(step: Duration) -> Self {
        Self::new(Pacing::Fixed { step })
    }

    /// Frames ticked so far
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Compute the timing of the next frame at wall-clock instant `now`
    pub fn advance(&mut self, now: Instant) -> FrameTime {
        let elapsed = match self.pacing {
            Pacing::RealTime => {
                let start = *self.start.get_or_insert(now);
                now.saturating_duration_since(start)
            }
            Pacing::Fixed { step } => step * self.frame as u32,
        };
        let delta = if self.frame == 0 {
            Duration::ZERO
        } else {
            elapsed.saturating_sub(self.last)
        };
        let time = FrameTime {
            frame: self.frame,
            elapsed,
            delta,
        };
        self.last = elapsed;
        self.frame += 1;
        time
    }

    /// Run one tick: `update` then `render`
    pub fn tick<S: Scene>(&mut self, now: Instant, scene: &mut S) -> Result<FrameTime, S::Error> {
        let time = self.advance(now);
        scene.update(time);
        scene.render(time)?;
        Ok(time)
    }
}
