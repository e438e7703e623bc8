//! wgpu implementation of the glass passes.
//!
//! The background and the content alpha each get a two-pass separable
//! Gaussian blur; a single fragment shader then renders either the drop
//! shadow or the glass body. Both are read back and composited onto the
//! target with tiny-skia so blend modes match the CPU backend exactly.
//!
//! Sized resources are built lazily and reused until the frame size changes.

use std::sync::mpsc;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use resvg::tiny_skia::{
    BlendMode as SkiaBlend, ColorU8, FilterQuality, IntSize, Pixmap, PixmapPaint, Transform,
};
use tracing::{debug, info, warn};

use super::shaders;
use super::{BackendKind, GlassInput, GlassParams, GlassRenderer, SATURATION_BOOST};
use crate::error::GlassError;
use crate::ops;
use crate::scene::ShadowKind;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct BlurUniforms {
    texel: [f32; 2],
    direction: [f32; 2],
    radius: f32,
    _pad: [f32; 3],
}

/// Layout mirrors `GlassUniforms` in the glass shader: six `vec4<f32>`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
struct GlassUniforms {
    frame: [f32; 4],
    light: [f32; 4],
    tint: [f32; 4],
    shadow: [f32; 4],
    bounds: [f32; 4],
    adjust: [f32; 4],
}

impl GlassUniforms {
    fn new(params: &GlassParams, pass_kind: f32, bounds: (u32, u32, u32, u32)) -> Self {
        let (shadow_kind, shadow_amount) = match params.shadow {
            None => (0.0, 0.0),
            Some((ShadowKind::Neutral, amount)) => (1.0, amount),
            Some((ShadowKind::Chromatic, amount)) => (2.0, amount),
        };
        let [r, g, b] = params.tint;
        Self {
            frame: [params.size as f32, pass_kind, params.translucency, params.content_alpha],
            light: [params.light.0, params.light.1, params.aberration, params.border_width],
            tint: [r, g, b, SATURATION_BOOST],
            shadow: [
                shadow_kind,
                shadow_amount,
                params.shadow_offset,
                if params.specular { 1.0 } else { 0.0 },
            ],
            bounds: [bounds.0 as f32, bounds.1 as f32, bounds.2 as f32, bounds.3 as f32],
            adjust: [params.inner_shadow, params.dark_adjust, params.mono_adjust, 0.0],
        }
    }
}

/// Per-size textures, uniform buffers, and bind groups.
struct SizedTargets {
    size: u32,
    padded_row: u32,
    content: wgpu::Texture,
    background: wgpu::Texture,
    shadow_out: wgpu::Texture,
    body_out: wgpu::Texture,
    blur_uniforms: [wgpu::Buffer; 4],
    glass_uniforms: [wgpu::Buffer; 2],
    /// Background H, background V, content H, content V.
    blur_passes: [(wgpu::BindGroup, wgpu::TextureView); 4],
    /// Shadow, body.
    glass_passes: [(wgpu::BindGroup, wgpu::TextureView); 2],
    readback: [wgpu::Buffer; 2],
}

/// GPU glass backend. Construction fails when no adapter or device is
/// available, or when a shader does not validate.
pub struct GpuGlassRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    blur_layout: wgpu::BindGroupLayout,
    glass_layout: wgpu::BindGroupLayout,
    blur_pipeline: wgpu::RenderPipeline,
    glass_pipeline: wgpu::RenderPipeline,
    sampler: wgpu::Sampler,
    targets: Option<SizedTargets>,
}

impl GpuGlassRenderer {
    pub fn new() -> Result<Self, GlassError> {
        pollster::block_on(Self::new_async())
    }

    async fn new_async() -> Result<Self, GlassError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| GlassError::GpuUnavailable("no suitable adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("liquid-icon glass device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| GlassError::GpuUnavailable(e.to_string()))?;

        let info = adapter.get_info();
        info!(adapter = %info.name, backend = ?info.backend, "gpu glass device ready");

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glass blur layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });
        let glass_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("glass layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                sampler_entry(3),
                uniform_entry(4),
            ],
        });

        let blur_pipeline = create_pipeline(&device, &blur_layout, "glass blur", &shaders::blur_shader());
        let glass_pipeline = create_pipeline(&device, &glass_layout, "glass", &shaders::glass_shader());

        if let Some(error) = device.pop_error_scope().await {
            return Err(GlassError::Shader(error.to_string()));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glass sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            device,
            queue,
            blur_layout,
            glass_layout,
            blur_pipeline,
            glass_pipeline,
            sampler,
            targets: None,
        })
    }

    fn ensure_targets(&mut self, size: u32) -> Result<(), GlassError> {
        if self.targets.as_ref().is_some_and(|t| t.size == size) {
            return Ok(());
        }
        let limits = self.device.limits();
        if size == 0 || size > limits.max_texture_dimension_2d {
            return Err(GlassError::Allocation(size));
        }
        if u64::from(padded_row(size)) * u64::from(size) > limits.max_buffer_size {
            return Err(GlassError::Allocation(size));
        }
        debug!(size, "allocating gpu glass targets");
        self.targets = None;

        // Failures surface here instead of reaching the device's uncaptured-error handler.
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let targets = self.build_targets(size);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        if let Some(error) = validation.or(out_of_memory) {
            warn!(size, %error, "gpu glass target allocation failed");
            return Err(GlassError::Allocation(size));
        }
        self.targets = Some(targets);
        Ok(())
    }

    fn build_targets(&self, size: u32) -> SizedTargets {
        let device = &self.device;
        let sampled = wgpu::TextureUsages::TEXTURE_BINDING;
        let upload = sampled | wgpu::TextureUsages::COPY_DST;
        let attachment = sampled | wgpu::TextureUsages::RENDER_ATTACHMENT;
        let output = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC;

        let content = create_texture(device, size, "glass content", upload);
        let background = create_texture(device, size, "glass background", upload);
        let backdrop_tmp = create_texture(device, size, "glass backdrop h", attachment);
        let backdrop = create_texture(device, size, "glass backdrop", attachment);
        let soft_tmp = create_texture(device, size, "glass soft alpha h", attachment);
        let soft = create_texture(device, size, "glass soft alpha", attachment);
        let shadow_out = create_texture(device, size, "glass shadow out", output);
        let body_out = create_texture(device, size, "glass body out", output);

        let view = |t: &wgpu::Texture| t.create_view(&wgpu::TextureViewDescriptor::default());
        let blur_uniforms = std::array::from_fn(|_| uniform_buffer(device, "glass blur uniforms"));
        let glass_uniforms = std::array::from_fn(|_| uniform_buffer(device, "glass uniforms"));

        let blur_bind = |src: &wgpu::Texture, uniforms: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("glass blur bind group"),
                layout: &self.blur_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view(src)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        };
        let blur_passes = [
            (blur_bind(&background, &blur_uniforms[0]), view(&backdrop_tmp)),
            (blur_bind(&backdrop_tmp, &blur_uniforms[1]), view(&backdrop)),
            (blur_bind(&content, &blur_uniforms[2]), view(&soft_tmp)),
            (blur_bind(&soft_tmp, &blur_uniforms[3]), view(&soft)),
        ];

        let (content_view, backdrop_view, soft_view) = (view(&content), view(&backdrop), view(&soft));
        let glass_bind = |uniforms: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("glass bind group"),
                layout: &self.glass_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&content_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&backdrop_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&soft_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        };
        let glass_passes = [
            (glass_bind(&glass_uniforms[0]), view(&shadow_out)),
            (glass_bind(&glass_uniforms[1]), view(&body_out)),
        ];

        let row = padded_row(size);
        let readback = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("glass readback"),
                size: u64::from(row) * u64::from(size),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            })
        });

        SizedTargets {
            size,
            padded_row: row,
            content,
            background,
            shadow_out,
            body_out,
            blur_uniforms,
            glass_uniforms,
            blur_passes,
            glass_passes,
            readback,
        }
    }

    fn upload(&self, texture: &wgpu::Texture, pixmap: &Pixmap) {
        let image = ops::pixmap_to_rgba_image(pixmap);
        let size = pixmap.width();
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size * 4),
                rows_per_image: Some(size),
            },
            extent(size),
        );
    }

    /// Reads a mapped readback buffer into a premultiplied pixmap.
    fn read_pixmap(&self, buffer: &wgpu::Buffer, size: u32, padded_row: u32) -> Result<Pixmap, GlassError> {
        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| GlassError::Readback(e.to_string()))?
            .map_err(|e| GlassError::Readback(e.to_string()))?;

        let row = (size * 4) as usize;
        let mut data = Vec::with_capacity(row * size as usize);
        {
            let mapped = slice.get_mapped_range();
            for chunk in mapped.chunks_exact(padded_row as usize) {
                for px in chunk[..row].chunks_exact(4) {
                    let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                    data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
                }
            }
        }
        buffer.unmap();

        let int_size = IntSize::from_wh(size, size).ok_or(GlassError::Allocation(size))?;
        Pixmap::from_vec(data, int_size).ok_or(GlassError::Allocation(size))
    }
}

impl GlassRenderer for GpuGlassRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn render_layer(&mut self, input: &GlassInput<'_>, target: &mut Pixmap) -> Result<(), GlassError> {
        let started = Instant::now();
        let params = GlassParams::new(input);
        let size = params.size;
        let Some(bounds) = ops::alpha_bounds(input.content) else {
            return Ok(());
        };
        self.ensure_targets(size)?;
        let Some(t) = self.targets.as_ref() else {
            return Err(GlassError::Allocation(size));
        };

        self.upload(&t.content, input.content);
        if input.background.width() == size && input.background.height() == size {
            self.upload(&t.background, input.background);
        } else {
            let mut scaled = Pixmap::new(size, size).ok_or(GlassError::Allocation(size))?;
            let sx = size as f32 / input.background.width() as f32;
            let sy = size as f32 / input.background.height() as f32;
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            scaled.draw_pixmap(0, 0, input.background.as_ref(), &paint, Transform::from_scale(sx, sy), None);
            self.upload(&t.background, &scaled);
        }

        let texel = [1.0 / size as f32; 2];
        let blur = |direction: [f32; 2], radius: f32| BlurUniforms {
            texel,
            direction,
            radius,
            _pad: [0.0; 3],
        };
        let backdrop_radius = params.blur_radius.max(1.0);
        let soft_radius = params.shadow_blur.max(params.aberration).max(1.0);
        let blur_values = [
            blur([1.0, 0.0], backdrop_radius),
            blur([0.0, 1.0], backdrop_radius),
            blur([1.0, 0.0], soft_radius),
            blur([0.0, 1.0], soft_radius),
        ];
        for (buffer, value) in t.blur_uniforms.iter().zip(&blur_values) {
            self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(value));
        }
        for (kind, buffer) in t.glass_uniforms.iter().enumerate() {
            let uniforms = GlassUniforms::new(&params, kind as f32, bounds);
            self.queue.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("glass layer encoder"),
        });
        for (bind_group, view) in &t.blur_passes {
            fullscreen_pass(&mut encoder, &self.blur_pipeline, bind_group, view);
        }
        for (bind_group, view) in &t.glass_passes {
            fullscreen_pass(&mut encoder, &self.glass_pipeline, bind_group, view);
        }
        for (texture, buffer) in [(&t.shadow_out, &t.readback[0]), (&t.body_out, &t.readback[1])] {
            encoder.copy_texture_to_buffer(
                wgpu::ImageCopyTexture {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::ImageCopyBuffer {
                    buffer,
                    layout: wgpu::ImageDataLayout {
                        offset: 0,
                        bytes_per_row: Some(t.padded_row),
                        rows_per_image: Some(size),
                    },
                },
                extent(size),
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GlassError::Readback(error.to_string()));
        }

        if params.shadow.is_some() {
            let shadow = self.read_pixmap(&t.readback[0], size, t.padded_row)?;
            target.draw_pixmap(
                0,
                0,
                shadow.as_ref(),
                &PixmapPaint {
                    opacity: input.opacity.clamp(0.0, 1.0),
                    blend_mode: SkiaBlend::SourceOver,
                    quality: FilterQuality::Nearest,
                },
                Transform::identity(),
                None,
            );
        }
        let body = self.read_pixmap(&t.readback[1], size, t.padded_row)?;
        target.draw_pixmap(
            0,
            0,
            body.as_ref(),
            &PixmapPaint {
                opacity: input.opacity.clamp(0.0, 1.0),
                blend_mode: input.blend_mode.to_skia(),
                quality: FilterQuality::Nearest,
            },
            Transform::identity(),
            None,
        );

        debug!(size, elapsed_us = started.elapsed().as_micros() as u64, "gpu glass layer rendered");
        Ok(())
    }
}

// ============================================================================
// wgpu helpers
// ============================================================================

/// Bytes per readback row, padded to the copy alignment.
fn padded_row(size: u32) -> u32 {
    (size * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

fn extent(size: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size,
        height: size,
        depth_or_array_layers: 1,
    }
}

fn create_texture(device: &wgpu::Device, size: u32, label: &str, usage: wgpu::TextureUsages) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage,
        view_formats: &[],
    })
}

fn uniform_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<GlassUniforms>().max(std::mem::size_of::<BlurUniforms>()) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    source: &str,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    view: &wgpu::TextureView,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("glass pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glass::CpuGlassRenderer;
    use crate::raster::rasterize_layer;
    use crate::scene::{AppearanceMode, BlendMode, Color, Fill, GlassConfig, Layer, Layout};
    use resvg::tiny_skia::Color as SkiaColor;

    const SIZE: u32 = 64;

    fn gpu() -> Option<GpuGlassRenderer> {
        match GpuGlassRenderer::new() {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                eprintln!("skipping gpu test: {e}");
                None
            }
        }
    }

    fn fixture() -> (Pixmap, Pixmap) {
        let layer = Layer::content("glass")
            .with_fill(Fill::solid(Color::rgb(240, 120, 40)))
            .with_layout(Layout::new(0.0, 0.0, 50.0));
        let content = rasterize_layer(&layer, None, SIZE).unwrap();
        let mut bg = Pixmap::new(SIZE, SIZE).unwrap();
        bg.fill(SkiaColor::from_rgba8(30, 90, 200, 255));
        (content, bg)
    }

    fn render(renderer: &mut dyn GlassRenderer, content: &Pixmap, bg: &Pixmap) -> Pixmap {
        let glass = GlassConfig::default();
        let input = GlassInput {
            content,
            background: bg,
            glass: &glass,
            light_angle: -30.0,
            appearance: AppearanceMode::Default,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        };
        let mut target = bg.clone();
        renderer.render_layer(&input, &mut target).unwrap();
        target
    }

    #[test]
    fn uniform_layouts_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<GlassUniforms>(), 96);
        assert_eq!(std::mem::size_of::<BlurUniforms>(), 32);
    }

    #[test]
    fn matches_cpu_backend_perceptually() {
        let Some(mut gpu) = gpu() else {
            return;
        };
        let (content, bg) = fixture();
        let from_gpu = render(&mut gpu, &content, &bg);
        let from_cpu = render(&mut CpuGlassRenderer::new(), &content, &bg);

        let diff: u64 = from_gpu
            .data()
            .iter()
            .zip(from_cpu.data())
            .map(|(a, b)| u64::from(a.abs_diff(*b)))
            .sum();
        let mean = diff as f64 / from_gpu.data().len() as f64;
        assert!(mean < 24.0, "mean channel difference {mean}");
    }

    #[test]
    fn reuses_targets_for_same_size() {
        let Some(mut gpu) = gpu() else {
            return;
        };
        let (content, bg) = fixture();
        render(&mut gpu, &content, &bg);
        let first = gpu.targets.as_ref().map(|t| t.size);
        render(&mut gpu, &content, &bg);
        assert_eq!(gpu.targets.as_ref().map(|t| t.size), first);
    }

    #[test]
    fn oversized_targets_fail_without_poisoning_the_device() {
        let Some(mut gpu) = gpu() else {
            return;
        };
        let limits = gpu.device.limits();
        let too_large = limits.max_texture_dimension_2d + 1;
        assert!(matches!(gpu.ensure_targets(too_large), Err(GlassError::Allocation(s)) if s == too_large));
        assert!(gpu.targets.is_none());

        // Textures within the dimension limit whose readback exceeds the buffer limit.
        let edge = limits.max_texture_dimension_2d;
        if u64::from(padded_row(edge)) * u64::from(edge) > limits.max_buffer_size {
            assert!(gpu.ensure_targets(edge).is_err());
            assert!(gpu.targets.is_none());
        }

        let (content, bg) = fixture();
        let recovered = render(&mut gpu, &content, &bg);
        assert_eq!(gpu.targets.as_ref().map(|t| t.size), Some(SIZE));
        assert_ne!(recovered.data(), bg.data());
    }

    #[test]
    fn readback_rows_are_copy_aligned() {
        assert_eq!(padded_row(64), 256);
        assert_eq!(padded_row(65), 512);
        assert_eq!(padded_row(1) % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
    }
}
