//! Track playback state and the per-callback mixer.

use std::sync::Arc;

use super::analyser::SampleTap;
use super::decoder::Track;

/// Playback state shared between the event loop and the audio callback
#[derive(Debug)]
pub struct Playback {
    track: Option<Arc<Track>>,

    /// Read position in track frames (fractional for resampling)
    position: f64,

    playing: bool,

    /// Output gain in [0, 1]
    volume: f32,

    looping: bool,
}

impl Playback {
    pub fn new(volume: f32) -> Self {
        Self {
            track: None,
            position: 0.0,
            playing: false,
            volume: volume.clamp(0.0, 1.0),
            looping: true,
        }
    }

    /// Replace the current track, rewinding to the start.
    /// The play/pause state is kept.
    pub fn load(&mut self, track: Arc<Track>) {
        self.track = Some(track);
        self.position = 0.0;
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_deref()
    }

    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Flip play/pause, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Current position in seconds
    pub fn position_secs(&self) -> f32 {
        match &self.track {
            Some(track) => (self.position / track.sample_rate as f64) as f32,
            None => 0.0,
        }
    }

    /// Fill an interleaved output buffer of `channels` channels at `output_rate` Hz.
    ///
    /// Every output frame also feeds the analyser tap with the pre-volume mono
    /// down-mix, or silence while paused.
    pub fn render(
        &mut self,
        out: &mut [f32],
        channels: usize,
        output_rate: u32,
        tap: &mut SampleTap,
    ) {
        if channels == 0 {
            return;
        }
        let track = match (&self.track, self.playing) {
            (Some(track), true) if output_rate > 0 => Arc::clone(track),
            _ => {
                out.fill(0.0);
                for _ in 0..out.len() / channels {
                    tap.push(0.0);
                }
                return;
            }
        };

        let frames = track.frames();
        let step = track.sample_rate as f64 / output_rate as f64;

        for frame in out.chunks_mut(channels) {
            if !self.playing {
                frame.fill(0.0);
                tap.push(0.0);
                continue;
            }

            let index = self.position.floor() as usize;
            let frac = (self.position - index as f64) as f32;
            let next = if index + 1 < frames {
                Some(index + 1)
            } else if self.looping {
                Some(0)
            } else {
                None
            };

            let mut mono = 0.0;
            for c in 0..track.channels {
                mono += interpolate(&track, index, next, c, frac);
            }
            tap.push(mono / track.channels as f32);

            for (c, slot) in frame.iter_mut().enumerate() {
                let source = if track.channels == 1 {
                    Some(0)
                } else if c < track.channels {
                    Some(c)
                } else {
                    None
                };
                *slot = match source {
                    Some(src) => interpolate(&track, index, next, src, frac) * self.volume,
                    None => 0.0,
                };
            }

            self.position += step;
            if self.position >= frames as f64 {
                if self.looping {
                    self.position -= frames as f64;
                } else {
                    self.position = 0.0;
                    self.playing = false;
                }
            }
        }
    }
}

fn interpolate(track: &Track, index: usize, next: Option<usize>, channel: usize, frac: f32) -> f32 {
    let a = track.sample(index, channel);
    let b = next.map_or(0.0, |n| track.sample(n, channel));
    a + (b - a) * frac
}
