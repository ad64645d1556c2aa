//! Audio system managing device output, playback and spectrum analysis.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use super::analyser::{SampleTap, SpectrumAnalyser};
use super::decoder::Track;
use super::playback::Playback;
use super::{AudioSource, PlaybackStatus};
use crate::error::AudioError;

/// Audio system playing a decoded track through the default output device
pub struct AudioSystem {
    /// Playback state shared with the audio callback
    playback: Arc<Mutex<Playback>>,

    /// Latest mono samples, written by the audio callback
    tap: Arc<Mutex<SampleTap>>,

    analyser: SpectrumAnalyser,

    /// Scratch copy of the tap for analysis
    window: Vec<f32>,

    /// Output stream created but not yet started by the user
    suspended: bool,

    /// Audio output stream (kept alive)
    stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device. The stream starts suspended; the first
    /// play/pause toggle resumes it.
    pub fn new(analyser: SpectrumAnalyser, volume: f32) -> Result<Self, AudioError> {
        let playback = Arc::new(Mutex::new(Playback::new(volume)));
        let playback_cb = Arc::clone(&playback);

        let tap = Arc::new(Mutex::new(SampleTap::new(analyser.fft_size())));
        let tap_cb = Arc::clone(&tap);

        // Setup audio output device
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device.default_output_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            warn!(
                format = ?supported.sample_format(),
                "default output format is not f32, requesting f32 anyway"
            );
        }
        let config: cpal::StreamConfig = supported.config();
        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            "audio output ready"
        );

        // Build audio output stream
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut playback = lock(&playback_cb);
                let mut tap = lock(&tap_cb);
                playback.render(data, channels, sample_rate, &mut tap);
            },
            |err| warn!("audio stream error: {}", err),
            None,
        )?;

        // Some hosts start streams immediately
        if let Err(e) = stream.pause() {
            warn!("could not suspend audio stream: {}", e);
        }

        Ok(Self {
            window: vec![0.0; analyser.fft_size()],
            playback,
            tap,
            analyser,
            suspended: true,
            stream,
        })
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.suspended {
            self.stream.play()?;
            self.suspended = false;
            info!("audio output resumed");
        }
        Ok(())
    }
}

impl AudioSource for AudioSystem {
    fn frequency_data(&mut self, out: &mut [u8]) -> bool {
        if !lock(&self.playback).has_track() {
            out.fill(0);
            return false;
        }
        lock(&self.tap).copy_latest(&mut self.window);
        self.analyser.byte_frequency_data(&self.window, out);
        true
    }

    fn toggle_play_pause(&mut self) -> Result<bool, AudioError> {
        self.resume()?;
        let playing = lock(&self.playback).toggle();
        info!(playing, "playback toggled");
        Ok(playing)
    }

    fn set_volume(&mut self, volume: f32) {
        lock(&self.playback).set_volume(volume);
    }

    fn load_file(&mut self, path: &Path) -> Result<String, AudioError> {
        let track = Track::open(path)?;
        let name = track.name.clone();
        info!(
            track = %name,
            channels = track.channels,
            sample_rate = track.sample_rate,
            duration_s = track.duration_secs(),
            "track loaded"
        );
        lock(&self.playback).load(Arc::new(track));

        // Start the new track's spectrum from silence
        lock(&self.tap).clear();
        self.analyser.reset();
        Ok(name)
    }

    fn status(&self) -> PlaybackStatus {
        let playback = lock(&self.playback);
        PlaybackStatus {
            playing: playback.is_playing(),
            volume: playback.volume(),
            track: playback.track().map(|t| t.name.clone()),
            suspended: self.suspended,
        }
    }
}

/// Lock a shared structure, recovering the data if a holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
