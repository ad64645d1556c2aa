//! Application state: smoothing, audio sampling, input handling and uniforms.

use std::time::Instant;

use tracing::{info, trace, warn};

use crate::audio::{extract_with, AudioSource, BandEnergies, PlaybackStatus};
use crate::controls::{ControlPanel, InputEvent, Notice, NoticeLevel, VOLUME_STEP};
use crate::error::RenderError;
use crate::frame::{FrameTime, Scene};
use crate::params::{BandLayout, Settings, SmoothingConfig};
use crate::rendering::{FractalUniforms, RenderBackend, SurfaceSize};
use crate::smoothing::ParameterSmoother;

const TITLE: &str = "Juliascope";

/// Request for the window owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    SetFullscreen(bool),
    Exit,
}

/// Everything one frame reads and input handlers write
pub struct Visualizer {
    smoother: ParameterSmoother,
    layout: BandLayout,
    audio: Option<Box<dyn AudioSource>>,
    spectrum: Vec<u8>,
    bands: BandEnergies,
    panel: ControlPanel,
    notice: Option<Notice>,
    surface: SurfaceSize,
    fullscreen: bool,
    uniforms: FractalUniforms,
}

impl Visualizer {
    /// `bin_count` is the analyser's frequency bin count
    pub fn new(
        settings: Settings,
        smoothing: SmoothingConfig,
        layout: BandLayout,
        bin_count: usize,
    ) -> Self {
        let bins = bin_count.max(layout.required_bins());
        Self {
            smoother: ParameterSmoother::new(settings, smoothing),
            layout,
            audio: None,
            spectrum: vec![0; bins],
            bands: BandEnergies::SILENT,
            panel: ControlPanel::default(),
            notice: None,
            surface: SurfaceSize::new(0, 0),
            fullscreen: false,
            uniforms: FractalUniforms::default(),
        }
    }

    pub fn attach_audio(&mut self, audio: Box<dyn AudioSource>) {
        self.audio = Some(audio);
    }

    pub fn current(&self) -> &Settings {
        self.smoother.current()
    }

    pub fn target(&self) -> &Settings {
        self.smoother.target()
    }

    pub fn bands(&self) -> BandEnergies {
        self.bands
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Uniforms computed by the last [`update`](Self::update)
    pub fn uniforms(&self) -> &FractalUniforms {
        &self.uniforms
    }

    pub fn audio_status(&self) -> PlaybackStatus {
        self.audio
            .as_ref()
            .map(|audio| audio.status())
            .unwrap_or_default()
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.surface = size;
    }

    /// Show a transient notice, replacing any current one
    pub fn notify(&mut self, message: impl Into<String>, level: NoticeLevel, now: Instant) {
        let notice = Notice::new(message, level, now);
        match level {
            NoticeLevel::Info => info!(notice = %notice.message),
            NoticeLevel::Error => warn!(notice = %notice.message),
        }
        self.notice = Some(notice);
    }

    /// Smooth settings, sample the spectrum and pack the frame's uniforms
    pub fn update(&mut self, time: FrameTime) {
        self.smoother.step();

        let active = match self.audio.as_mut() {
            Some(audio) => audio.frequency_data(&mut self.spectrum),
            None => false,
        };
        self.bands = if active {
            extract_with(&self.spectrum, &self.layout)
        } else {
            BandEnergies::SILENT
        };

        let current = self.smoother.current();
        let t = time.elapsed_secs() * current.speed;
        self.uniforms = FractalUniforms::new(current, self.bands, t, self.surface);
        trace!(frame = time.frame, t, bass = self.bands.bass, "frame updated");
    }

    /// Apply one input event. Window-level effects are returned to the caller.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Option<WindowCommand> {
        match event {
            InputEvent::SetTarget(key, value) => self.smoother.set_target(key, value),
            InputEvent::NudgeSelected(steps) => {
                let key = self.panel.selected();
                let value = key.slider().nudge(self.smoother.target().get(key), steps);
                self.smoother.set_target(key, value);
            }
            InputEvent::SelectSetting(direction) => self.panel.select(direction),
            InputEvent::TogglePlayPause => self.toggle_playback(now),
            InputEvent::SetVolume(volume) => self.set_volume(volume),
            InputEvent::NudgeVolume(steps) => {
                let volume = self.audio_status().volume + VOLUME_STEP * steps as f32;
                self.set_volume(volume);
            }
            InputEvent::LoadFile(path) => {
                let result = match self.audio.as_mut() {
                    Some(audio) => audio.load_file(&path).map_err(|e| e.to_string()),
                    None => Err("audio output is unavailable".to_string()),
                };
                match result {
                    Ok(name) => self.notify(format!("Loaded {}", name), NoticeLevel::Info, now),
                    Err(e) => self.notify(
                        format!("could not load {}: {}", path.display(), e),
                        NoticeLevel::Error,
                        now,
                    ),
                }
            }
            InputEvent::ToggleControls(force) => self.panel.toggle(force),
            InputEvent::PlayPauseAndControls => {
                self.toggle_playback(now);
                self.panel.toggle(None);
            }
            InputEvent::ToggleFullscreen => {
                return Some(WindowCommand::SetFullscreen(!self.fullscreen))
            }
            InputEvent::FullscreenChanged(on) => {
                self.fullscreen = on;
                if !on {
                    self.panel.toggle(Some(false));
                }
            }
            InputEvent::Escape => {
                return Some(if self.fullscreen {
                    WindowCommand::SetFullscreen(false)
                } else {
                    WindowCommand::Exit
                })
            }
            InputEvent::DismissNotice => self.notice = None,
        }
        None
    }

    fn toggle_playback(&mut self, now: Instant) {
        let Some(audio) = self.audio.as_mut() else {
            self.notify("audio output is unavailable", NoticeLevel::Error, now);
            return;
        };
        if let Err(e) = audio.toggle_play_pause() {
            self.notify(format!("playback failed: {}", e), NoticeLevel::Error, now);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(audio) = self.audio.as_mut() {
            audio.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    /// Window title: the notice (until it expires) and the panel when visible
    pub fn title(&mut self, now: Instant) -> String {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }

        let mut title = TITLE.to_string();
        if let Some(notice) = &self.notice {
            title.push_str(" | ");
            title.push_str(&notice.text());
        }
        if self.panel.is_visible() {
            let status = self.audio_status();
            title.push_str(" | ");
            title.push_str(&self.panel.summary(
                self.smoother.current(),
                self.smoother.target(),
                &status,
            ));
        }
        title
    }
}

/// A visualizer paired with the backend that draws it
pub struct Stage<'a, B: RenderBackend> {
    pub visualizer: &'a mut Visualizer,
    pub backend: &'a mut B,
}

impl<'a, B: RenderBackend> Stage<'a, B> {
    pub fn new(visualizer: &'a mut Visualizer, backend: &'a mut B) -> Self {
        Self {
            visualizer,
            backend,
        }
    }
}

impl<B: RenderBackend> Scene for Stage<'_, B> {
    type Error = RenderError;

    fn update(&mut self, time: FrameTime) {
        self.visualizer.update(time);
    }

    fn render(&mut self, _time: FrameTime) -> Result<(), RenderError> {
        if self.visualizer.surface().is_empty() {
            return Ok(());
        }
        self.backend.draw(self.visualizer.uniforms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::params::SettingKey;
    use approx::assert_relative_eq;
    use std::path::Path;
    use std::time::Duration;

    struct FixedAudio {
        spectrum: Vec<u8>,
        status: PlaybackStatus,
    }

    impl FixedAudio {
        fn new(spectrum: Vec<u8>) -> Self {
            Self {
                spectrum,
                status: PlaybackStatus {
                    volume: 1.0,
                    suspended: true,
                    ..Default::default()
                },
            }
        }
    }

    impl AudioSource for FixedAudio {
        fn frequency_data(&mut self, out: &mut [u8]) -> bool {
            out.fill(0);
            let n = out.len().min(self.spectrum.len());
            out[..n].copy_from_slice(&self.spectrum[..n]);
            true
        }

        fn toggle_play_pause(&mut self) -> Result<bool, AudioError> {
            self.status.suspended = false;
            self.status.playing = !self.status.playing;
            Ok(self.status.playing)
        }

        fn set_volume(&mut self, volume: f32) {
            self.status.volume = volume;
        }

        fn load_file(&mut self, path: &Path) -> Result<String, AudioError> {
            if path.extension().is_some_and(|ext| ext == "wav") {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                self.status.track = name.clone();
                Ok(name.unwrap_or_default())
            } else {
                Err(AudioError::Unsupported(path.display().to_string()))
            }
        }

        fn status(&self) -> PlaybackStatus {
            self.status.clone()
        }
    }

    fn frame(n: u64, secs: f32) -> FrameTime {
        FrameTime {
            frame: n,
            elapsed: Duration::from_secs_f32(secs),
            delta: Duration::ZERO,
        }
    }

    fn visualizer() -> Visualizer {
        let mut vis = Visualizer::new(
            Settings::default(),
            SmoothingConfig::default(),
            BandLayout::default(),
            128,
        );
        vis.resize(SurfaceSize::new(800, 600));
        vis
    }

    #[test]
    fn test_update_without_audio_is_silent() {
        let mut vis = visualizer();
        vis.update(frame(0, 0.0));
        assert_eq!(vis.bands(), BandEnergies::SILENT);
        assert_eq!(vis.uniforms().bass, 0.0);
        assert_eq!(vis.uniforms().resolution, [800.0, 600.0]);
    }

    #[test]
    fn test_update_extracts_bands_from_source() {
        let mut spectrum = vec![50; 4];
        spectrum.extend([100; 8]);
        let mut vis = visualizer();
        vis.attach_audio(Box::new(FixedAudio::new(spectrum)));
        vis.update(frame(0, 0.0));
        assert_relative_eq!(vis.bands().bass, 200.0 / 1020.0, epsilon = 1e-6);
        assert_relative_eq!(vis.bands().mid, 800.0 / 2040.0, epsilon = 1e-6);
        assert_eq!(vis.bands().high, 0.0);
    }

    #[test]
    fn test_time_is_scaled_by_speed() {
        let mut vis = Visualizer::new(
            Settings {
                speed: 2.0,
                ..Default::default()
            },
            SmoothingConfig::default(),
            BandLayout::default(),
            128,
        );
        vis.update(frame(10, 1.5));
        assert_relative_eq!(vis.uniforms().time, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_slider_writes_target_and_update_smooths() {
        let mut vis = visualizer();
        let now = Instant::now();
        vis.handle(InputEvent::SetTarget(SettingKey::Zoom, 2.0), now);
        assert_eq!(vis.current().zoom, 1.0);
        assert_eq!(vis.target().zoom, 2.0);
        vis.update(frame(0, 0.0));
        assert_relative_eq!(vis.current().zoom, 1.05, epsilon = 1e-6);
        assert_relative_eq!(vis.uniforms().zoom, 1.05, epsilon = 1e-6);
    }

    #[test]
    fn test_nudge_moves_selected_target_within_range() {
        let mut vis = visualizer();
        let now = Instant::now();
        vis.handle(InputEvent::SelectSetting(1), now);
        vis.handle(InputEvent::NudgeSelected(100), now);
        assert_eq!(vis.target().zoom, 5.0);
    }

    #[test]
    fn test_spacebar_toggles_playback_and_panel() {
        let mut vis = visualizer();
        vis.attach_audio(Box::new(FixedAudio::new(vec![])));
        let now = Instant::now();
        vis.handle(InputEvent::PlayPauseAndControls, now);
        let status = vis.audio_status();
        assert!(status.playing);
        assert!(!status.suspended);
        assert!(vis.panel().is_visible());

        vis.handle(InputEvent::PlayPauseAndControls, now);
        assert!(!vis.audio_status().playing);
        assert!(!vis.panel().is_visible());
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut vis = visualizer();
        vis.attach_audio(Box::new(FixedAudio::new(vec![])));
        let now = Instant::now();
        vis.handle(InputEvent::SetVolume(1.7), now);
        assert_eq!(vis.audio_status().volume, 1.0);
        vis.handle(InputEvent::NudgeVolume(-2), now);
        assert_relative_eq!(vis.audio_status().volume, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_load_failure_raises_error_notice() {
        let mut vis = visualizer();
        vis.attach_audio(Box::new(FixedAudio::new(vec![])));
        let now = Instant::now();
        vis.handle(InputEvent::LoadFile("cover.png".into()), now);
        assert_eq!(vis.notice().map(|n| n.level), Some(NoticeLevel::Error));

        vis.handle(InputEvent::LoadFile("music/song.wav".into()), now);
        assert_eq!(vis.notice().map(|n| n.text()), Some("Loaded song.wav".into()));
        assert_eq!(vis.audio_status().track.as_deref(), Some("song.wav"));
    }

    #[test]
    fn test_escape_leaves_fullscreen_before_exiting() {
        let mut vis = visualizer();
        let now = Instant::now();
        assert_eq!(
            vis.handle(InputEvent::ToggleFullscreen, now),
            Some(WindowCommand::SetFullscreen(true))
        );
        vis.handle(InputEvent::FullscreenChanged(true), now);
        assert!(vis.is_fullscreen());
        vis.handle(InputEvent::ToggleControls(Some(true)), now);
        assert_eq!(
            vis.handle(InputEvent::Escape, now),
            Some(WindowCommand::SetFullscreen(false))
        );
        vis.handle(InputEvent::FullscreenChanged(false), now);
        assert!(!vis.panel().is_visible());
        assert_eq!(vis.handle(InputEvent::Escape, now), Some(WindowCommand::Exit));
    }

    #[test]
    fn test_title_shows_notice_until_expired() {
        let mut vis = visualizer();
        let now = Instant::now();
        vis.notify("no GPU", NoticeLevel::Error, now);
        assert_eq!(vis.title(now), "Juliascope | Error: no GPU");
        assert_eq!(vis.title(now + Duration::from_secs(4)), "Juliascope");
        assert!(vis.notice().is_none());
    }

    #[test]
    fn test_any_key_dismisses_notice() {
        let mut vis = visualizer();
        let now = Instant::now();
        vis.notify("hello", NoticeLevel::Info, now);
        vis.handle(InputEvent::DismissNotice, now);
        assert_eq!(vis.title(now), "Juliascope");
    }

    #[test]
    fn test_play_without_audio_output_notifies() {
        let mut vis = visualizer();
        vis.handle(InputEvent::TogglePlayPause, Instant::now());
        assert_eq!(vis.notice().map(|n| n.level), Some(NoticeLevel::Error));
    }
}
