//! wgpu backend: one fullscreen triangle shaded by `fractal.wgsl`.

use std::sync::{mpsc, Arc};

use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;

use super::{FractalUniforms, RenderBackend, SurfaceSize};
use crate::error::{RenderError, VisualizerError};
use crate::params::RecordingConfig;

/// GPU state for drawing the fractal into the window surface
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    recording_config: Option<RecordingConfig>,
    frames_rendered: u64,
}

impl RenderSystem {
    /// Create new rendering system.
    ///
    /// Fails with [`VisualizerError::NoAdapter`] when no GPU can drive the window.
    pub async fn new(
        window: Arc<winit::window::Window>,
        recording_config: Option<RecordingConfig>,
    ) -> Result<Self, VisualizerError> {
        let size = SurfaceSize::of_window(&window);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Arc<Window> gives the surface its 'static lifetime
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(VisualizerError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "GPU adapter selected"
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Juliascope Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // Configure surface; shader colors are authored for a non-sRGB target
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(VisualizerError::IncompatibleSurface)?;

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;

        // Captured frames are copied out of the surface texture
        if recording_config.is_some() {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fractal Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("fractal.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fractal Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FractalUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Fractal Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Fractal Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fractal Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        // Fullscreen triangle: no vertex buffers
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Fractal Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            recording_config,
            frames_rendered: 0,
        })
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Read the presented texture back and write it as a PNG
    fn capture_frame(
        &self,
        frame_num: u64,
        config: &RecordingConfig,
        texture: &wgpu::SurfaceTexture,
    ) -> Result<(), RenderError> {
        let (width, height) = (self.config.width, self.config.height);
        let bytes_per_pixel = 4; // RGBA8 / BGRA8
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        // Map buffer and wait for the copy
        let buffer_slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        wait_for_mapping(&rx)?;

        let data = buffer_slice.get_mapped_range();
        let swap_red_blue = matches!(
            self.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        let mut image_data = Vec::with_capacity((width * height * bytes_per_pixel) as usize);

        // Remove row padding
        for y in 0..height {
            let offset = (y * padded_bytes_per_row) as usize;
            let row = &data[offset..offset + unpadded_bytes_per_row as usize];
            if swap_red_blue {
                for px in row.chunks_exact(4) {
                    image_data.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
                }
            } else {
                image_data.extend_from_slice(row);
            }
        }

        drop(data);
        buffer.unmap();

        let frame_path = config.frame_path(frame_num);
        image::save_buffer(
            &frame_path,
            &image_data,
            width,
            height,
            image::ColorType::Rgba8,
        )
        .map_err(|source| RenderError::Capture {
            frame: frame_num,
            source,
        })?;
        debug!(path = %frame_path.display(), "frame captured");
        Ok(())
    }
}

impl RenderSystem {
    /// Next surface texture, reconfiguring once if the surface was lost.
    ///
    /// `None` means this frame is skipped.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        match self.surface.get_current_texture() {
            Ok(output) => return Ok(Some(output)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.reconfigure();
            }
            Err(e) => return Err(e.into()),
        }
        match self.surface.get_current_texture() {
            Ok(output) => Ok(Some(output)),
            Err(e) => {
                skip_lost_frame(e, self.recording_config.is_some())?;
                Ok(None)
            }
        }
    }
}

/// A live window may drop a frame to a lost surface; a recording may not,
/// since every frame number must end up on disk.
fn skip_lost_frame(err: wgpu::SurfaceError, recording: bool) -> Result<(), RenderError> {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated if !recording => {
            warn!(error = %err, "surface still unavailable, skipping frame");
            Ok(())
        }
        err => Err(err.into()),
    }
}

/// Block until the map callback has reported.
fn wait_for_mapping(
    rx: &mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>,
) -> Result<(), RenderError> {
    rx.recv().map_err(|_| RenderError::MapAbandoned)??;
    Ok(())
}

impl RenderBackend for RenderSystem {
    fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
        debug!(width = size.width, height = size.height, "surface resized");
    }

    /// Render a frame (and capture it if recording)
    fn draw(&mut self, uniforms: &FractalUniforms) -> Result<(), RenderError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));

        let Some(output) = self.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fractal Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Fractal Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let frame_num = self.frames_rendered;
        self.frames_rendered += 1;

        let capture = match &self.recording_config {
            Some(config) => self.capture_frame(frame_num, config, &output),
            None => Ok(()),
        };

        output.present();
        capture
    }
}
