//! User input events, the settings panel and transient notices.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use winit::keyboard::KeyCode;

use crate::audio::PlaybackStatus;
use crate::params::{SettingKey, Settings};

/// How long a notice stays up unless dismissed
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Volume slider step
pub const VOLUME_STEP: f32 = 0.05;

/// Input decoupled from any windowing toolkit
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Slider moved: write a setting's target
    SetTarget(SettingKey, f32),

    /// Move the selected slider by a number of steps
    NudgeSelected(i32),

    /// Select the next (+1) or previous (-1) slider
    SelectSetting(i32),

    TogglePlayPause,

    /// Volume slider value in [0, 1]
    SetVolume(f32),

    /// Move the volume slider by a number of steps
    NudgeVolume(i32),

    /// File picked (or dropped on the window)
    LoadFile(PathBuf),

    /// Toggle the settings panel, or force it to a state
    ToggleControls(Option<bool>),

    /// Spacebar: playback and panel together
    PlayPauseAndControls,

    ToggleFullscreen,

    /// Fullscreen was entered (true) or left (false)
    FullscreenChanged(bool),

    /// Escape: leave fullscreen, otherwise quit
    Escape,

    DismissNotice,
}

/// Map a pressed key to an input event.
///
/// Slider keys only act while the panel is visible.
pub fn map_key(code: KeyCode, panel_visible: bool) -> Option<InputEvent> {
    let event = match code {
        KeyCode::Space => InputEvent::PlayPauseAndControls,
        KeyCode::KeyP => InputEvent::TogglePlayPause,
        KeyCode::Tab | KeyCode::KeyH => InputEvent::ToggleControls(None),
        KeyCode::KeyF | KeyCode::F11 => InputEvent::ToggleFullscreen,
        KeyCode::Escape => InputEvent::Escape,
        KeyCode::Minus => InputEvent::NudgeVolume(-1),
        KeyCode::Equal => InputEvent::NudgeVolume(1),
        KeyCode::ArrowUp if panel_visible => InputEvent::SelectSetting(-1),
        KeyCode::ArrowDown if panel_visible => InputEvent::SelectSetting(1),
        KeyCode::ArrowLeft if panel_visible => InputEvent::NudgeSelected(-1),
        KeyCode::ArrowRight if panel_visible => InputEvent::NudgeSelected(1),
        _ => return None,
    };
    Some(event)
}

/// Visibility and selection of the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPanel {
    visible: bool,
    selected: SettingKey,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            visible: false,
            selected: SettingKey::Iterations,
        }
    }
}

impl ControlPanel {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility, or force it when `force` is given
    pub fn toggle(&mut self, force: Option<bool>) {
        self.visible = force.unwrap_or(!self.visible);
    }

    pub fn selected(&self) -> SettingKey {
        self.selected
    }

    pub fn select(&mut self, direction: i32) {
        if direction > 0 {
            self.selected = self.selected.next();
        } else if direction < 0 {
            self.selected = self.selected.prev();
        }
    }

    /// One-line panel text: slider values, playback and volume
    pub fn summary(&self, current: &Settings, target: &Settings, audio: &PlaybackStatus) -> String {
        let mut text = String::new();
        for key in SettingKey::ALL {
            let marker = if key == self.selected { ">" } else { "" };
            let (now, goal) = (current.get(key), target.get(key));
            if now == goal {
                let _ = write!(text, "{}{} {:.2}  ", marker, key, now);
            } else {
                let _ = write!(text, "{}{} {:.2}->{:.2}  ", marker, key, now, goal);
            }
        }
        let state = if audio.playing { "playing" } else { "paused" };
        let track = audio.track.as_deref().unwrap_or("no track");
        let _ = write!(text, "| {} {} | vol {:.2}", state, track, audio.volume);
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, dismissible message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    shown_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel, now: Instant) -> Self {
        Self {
            message: message.into(),
            level,
            shown_at: now,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_DURATION
    }

    pub fn text(&self) -> String {
        match self.level {
            NoticeLevel::Info => self.message.clone(),
            NoticeLevel::Error => format!("Error: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_maps_to_combined_toggle() {
        assert_eq!(
            map_key(KeyCode::Space, false),
            Some(InputEvent::PlayPauseAndControls)
        );
    }

    #[test]
    fn test_slider_keys_need_visible_panel() {
        assert_eq!(map_key(KeyCode::ArrowRight, false), None);
        assert_eq!(
            map_key(KeyCode::ArrowRight, true),
            Some(InputEvent::NudgeSelected(1))
        );
        assert_eq!(
            map_key(KeyCode::ArrowUp, true),
            Some(InputEvent::SelectSetting(-1))
        );
        assert_eq!(map_key(KeyCode::KeyZ, true), None);
    }

    #[test]
    fn test_panel_toggle_and_force() {
        let mut panel = ControlPanel::default();
        assert!(!panel.is_visible());
        panel.toggle(None);
        assert!(panel.is_visible());
        panel.toggle(Some(true));
        assert!(panel.is_visible());
        panel.toggle(Some(false));
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_panel_selection_cycles() {
        let mut panel = ControlPanel::default();
        panel.select(1);
        assert_eq!(panel.selected(), SettingKey::Zoom);
        panel.select(-1);
        panel.select(-1);
        assert_eq!(panel.selected(), SettingKey::KaleidoscopeSegments);
        panel.select(0);
        assert_eq!(panel.selected(), SettingKey::KaleidoscopeSegments);
    }

    #[test]
    fn test_summary_shows_pending_targets() {
        let panel = ControlPanel::default();
        let current = Settings::default();
        let target = Settings {
            zoom: 2.0,
            ..Default::default()
        };
        let status = PlaybackStatus {
            playing: true,
            volume: 0.5,
            track: Some("song.wav".to_string()),
            suspended: false,
        };
        let text = panel.summary(&current, &target, &status);
        assert!(text.starts_with(">iterations 200.00"));
        assert!(text.contains("zoom 1.00->2.00"));
        assert!(text.ends_with("| playing song.wav | vol 0.50"));
    }

    #[test]
    fn test_notice_expires_after_three_seconds() {
        let t0 = Instant::now();
        let notice = Notice::new("GPU rendering is not supported", NoticeLevel::Error, t0);
        assert!(!notice.is_expired(t0 + Duration::from_millis(2999)));
        assert!(notice.is_expired(t0 + NOTICE_DURATION));
        assert_eq!(notice.text(), "Error: GPU rendering is not supported");
    }
}
