use std::time::{Duration, Instant};

use anyhow::Result;
use aurora::FrameInputs;
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::types::{GpuOptions, SurfaceAlpha};

use super::context::GpuContext;
use super::pipeline::AuroraPipeline;
use super::uniforms::AuroraUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Everything needed to paint the aurora into one window surface.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: AuroraPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: AuroraUniforms,
    multisample_target: Option<MultisampleTarget>,
    clear_color: wgpu::Color,
    frames_since_report: u32,
    last_report: Instant,
}

impl GpuState {
    pub(crate) fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        initial_size: PhysicalSize<u32>,
        options: GpuOptions,
    ) -> Result<Self> {
        let context = GpuContext::new(target, initial_size, options)?;
        let pipeline =
            AuroraPipeline::new(&context.device, context.surface_format, context.sample_count);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<AuroraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let uniforms = AuroraUniforms::new(context.size.width, context.size.height);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let multisample_target = Self::multisample_target_for(&context);
        let clear_color = match options.surface_alpha {
            SurfaceAlpha::Opaque => wgpu::Color::BLACK,
            SurfaceAlpha::Transparent => wgpu::Color::TRANSPARENT,
        };

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            multisample_target,
            clear_color,
            frames_since_report: 0,
            last_report: Instant::now(),
        })
    }

    fn multisample_target_for(context: &GpuContext) -> Option<MultisampleTarget> {
        (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.multisample_target = Self::multisample_target_for(&self.context);
    }

    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    pub(crate) fn render(&mut self, inputs: &FrameInputs) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        self.uniforms.update(inputs);
        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let (attachment_view, resolve_target) =
                if let Some(msaa) = self.multisample_target.as_ref() {
                    (&msaa.view, Some(&view))
                } else {
                    (&view, None)
                };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.report_stats(inputs);
        Ok(())
    }

    fn report_stats(&mut self, inputs: &FrameInputs) {
        self.frames_since_report += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames_since_report as f32 / elapsed.as_secs_f32();
            debug!(
                fps = fps.round(),
                tick = inputs.tick,
                time = inputs.time,
                "render stats"
            );
            self.frames_since_report = 0;
            self.last_report = Instant::now();
        }
    }
}
