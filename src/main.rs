//! Juliascope - audio-reactive kaleidoscopic Julia-set visualizer
//!
//! A looping track drives the colors of two blended Julia sets folded
//! through a kaleidoscope; sliders ease toward their targets every frame.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

use juliascope::audio::{AudioSystem, SpectrumAnalyser};
use juliascope::cli::{AppConfig, Args};
use juliascope::controls::{map_key, InputEvent, NoticeLevel};
use juliascope::frame::FrameDriver;
use juliascope::rendering::{RenderBackend, RenderSystem, SurfaceSize};
use juliascope::visualizer::{Stage, Visualizer, WindowCommand};

/// Title refresh interval while nothing is being rendered
const IDLE_TICK: Duration = Duration::from_millis(250);

/// Main application state
struct App {
    config: AppConfig,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    title: String,

    visualizer: Visualizer,
    driver: FrameDriver,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let visualizer = Visualizer::new(
            config.settings,
            config.smoothing,
            config.bands.clone(),
            config.analyser.frequency_bin_count(),
        );
        let driver = match &config.recording {
            Some(recording) => FrameDriver::fixed(recording.frame_step()),
            None => FrameDriver::real_time(),
        };

        Self {
            config,
            window: None,
            render_system: None,
            title: String::new(),
            visualizer,
            driver,
        }
    }

    /// Open the output device and load the startup track
    fn init_audio(&mut self) {
        let now = Instant::now();
        let analyser = match SpectrumAnalyser::new(self.config.analyser.clone()) {
            Ok(analyser) => analyser,
            Err(e) => {
                self.visualizer
                    .notify(format!("audio analysis disabled: {}", e), NoticeLevel::Error, now);
                return;
            }
        };

        match AudioSystem::new(analyser, self.config.volume) {
            Ok(audio) => self.visualizer.attach_audio(Box::new(audio)),
            Err(e) => {
                self.visualizer
                    .notify(format!("audio output unavailable: {}", e), NoticeLevel::Error, now);
                return;
            }
        }

        if let Some(path) = self.config.audio_file.clone() {
            self.visualizer.handle(InputEvent::LoadFile(path), now);
        }
    }

    fn apply(&mut self, command: WindowCommand, event_loop: &ActiveEventLoop) {
        match command {
            WindowCommand::Exit => event_loop.exit(),
            WindowCommand::SetFullscreen(on) => self.set_fullscreen(on),
        }
    }

    fn set_fullscreen(&mut self, on: bool) {
        let Some(window) = &self.window else {
            return;
        };
        window.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
        let now = Instant::now();
        let achieved = window.fullscreen().is_some();
        if on && !achieved {
            self.visualizer
                .notify("fullscreen was refused", NoticeLevel::Error, now);
        }
        self.visualizer
            .handle(InputEvent::FullscreenChanged(achieved), now);
    }

    fn resize(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let size = SurfaceSize::of_window(window);
        self.visualizer.resize(size);
        if let Some(render_system) = &mut self.render_system {
            render_system.resize(size);
        }
    }

    fn refresh_title(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let title = self.visualizer.title(Instant::now());
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = &mut self.render_system else {
            return;
        };

        let mut stage = Stage::new(&mut self.visualizer, render_system);
        match self.driver.tick(Instant::now(), &mut stage) {
            Ok(time) => {
                if time.frame % 600 == 0 {
                    debug!(frame = time.frame, elapsed = time.elapsed_secs(), "rendering");
                }
            }
            Err(e) if self.config.recording.is_some() => {
                error!(error = %e, "recording failed");
                event_loop.exit();
                return;
            }
            Err(e) => warn!(error = %e, "frame dropped"),
        }

        if let Some(recording) = &self.config.recording {
            if self.driver.frames() >= recording.total_frames() {
                info!(
                    frames = self.driver.frames(),
                    dir = %recording.frames_dir().display(),
                    "recording complete"
                );
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.refresh_title();
        if self.render_system.is_none() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + IDLE_TICK));
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let render_config = &self.config.render;
        let window_attributes = Window::default_attributes()
            .with_title("Juliascope")
            .with_inner_size(winit::dpi::LogicalSize::new(
                render_config.window_width,
                render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(error = %e, "failed to create window");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(Arc::clone(&window));
        self.visualizer.resize(SurfaceSize::of_window(&window));

        // Initialize rendering system; without it the window stays idle
        let recording = self.config.recording.clone();
        match pollster::block_on(RenderSystem::new(Arc::clone(&window), recording)) {
            Ok(render_system) => self.render_system = Some(render_system),
            Err(e) => {
                error!(error = %e, "visual setup halted");
                self.visualizer
                    .notify(e.to_string(), NoticeLevel::Error, Instant::now());
                return;
            }
        }

        self.init_audio();

        if self.config.render.fullscreen {
            self.set_fullscreen(true);
        }

        info!("Juliascope is running (Space: play + panel, F: fullscreen, Esc: quit)");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let now = Instant::now();
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if self.visualizer.notice().is_some() {
                    self.visualizer.handle(InputEvent::DismissNotice, now);
                }
                let visible = self.visualizer.panel().is_visible();
                if let Some(input) = map_key(code, visible) {
                    if let Some(command) = self.visualizer.handle(input, now) {
                        self.apply(command, event_loop);
                    }
                }
            }
            WindowEvent::DroppedFile(path) => {
                self.visualizer.handle(InputEvent::LoadFile(path), now);
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let config = args.resolve().context("invalid configuration")?;

    if let Some(recording) = &config.recording {
        let dir = recording.frames_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        info!(
            seconds = recording.duration_secs,
            frames = recording.total_frames(),
            "recording mode"
        );
    }

    let mut app = App::new(config);
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
