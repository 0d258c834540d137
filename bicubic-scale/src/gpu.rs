// SPDX-License-Identifier: MIT
// GPU-parallel backend on a wgpu compute shader.
// Source bytes are uploaded as packed u32 words; each invocation writes one
// packed output word. Dispatch, device sync and readback all happen inside
// `resize`, so callers see a single blocking call.

use std::fmt;
use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::engine::{validate_request, BackendKind, ResampleBackend, ScaleError};
use crate::image::{Image, Size};

const SHADER: &str = include_str!("gpu/resample.wgsl");
const WORKGROUP_SIZE: u32 = 256;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Params {
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    channels: u32,
    // Invocations per dispatch row when the grid wraps into 2D
    row_stride: u32,
    scale_x: f32,
    scale_y: f32,
}

/// Compute-shader backend. Device and pipeline are created once in
/// [`GpuParallelBackend::new`]; each resize only allocates its buffers.
pub struct GpuParallelBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    adapter_name: String,
    max_binding_size: u64,
    max_groups_per_dim: u32,
}

impl fmt::Debug for GpuParallelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuParallelBackend")
            .field("adapter", &self.adapter_name)
            .finish()
    }
}

impl GpuParallelBackend {
    /// Acquire an adapter and device and build the resample pipeline.
    ///
    /// # Errors
    ///
    /// `DeviceUnavailable` when no adapter exists, the device request fails,
    /// or the adapter cannot build the resample pipeline.
    pub fn new() -> Result<Self, ScaleError> {
        pollster::block_on(Self::init())
    }

    async fn init() -> Result<Self, ScaleError> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| ScaleError::DeviceUnavailable("no compatible GPU adapter found".into()))?;

        let adapter_name = adapter.get_info().name;
        let limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("bicubic-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits.clone(),
                },
                None,
            )
            .await
            .map_err(|e| ScaleError::DeviceUnavailable(e.to_string()))?;

        // Shader translation (GL in particular) can fail at pipeline creation.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bicubic-resample"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bicubic-resample-layout"),
            entries: &[
                buffer_entry(0, wgpu::BufferBindingType::Uniform),
                buffer_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                buffer_entry(2, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bicubic-resample-pipeline-layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("bicubic-resample"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "resample",
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(ScaleError::DeviceUnavailable(format!(
                "resample pipeline rejected by '{}': {}",
                adapter_name, err
            )));
        }

        log::info!("GPU backend ready on adapter '{}'", adapter_name);

        Ok(Self {
            device,
            queue,
            pipeline,
            layout,
            adapter_name,
            max_binding_size: (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size),
            max_groups_per_dim: limits.max_compute_workgroups_per_dimension,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    fn read_back(&self, buffer: &wgpu::Buffer, len: usize) -> Result<Vec<u8>, ScaleError> {
        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ScaleError::Device(format!("buffer map failed: {}", e))),
            Err(e) => return Err(ScaleError::Device(format!("map callback dropped: {}", e))),
        }
        let data = slice.get_mapped_range();
        let bytes = data[..len].to_vec();
        drop(data);
        buffer.unmap();
        Ok(bytes)
    }
}

impl ResampleBackend for GpuParallelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::GpuParallel
    }

    fn resize(&self, src: &Image, target: Size) -> Result<Image, ScaleError> {
        let geo = validate_request(src, target)?;
        let channels = src.channels() as u32;

        let total = target.pixel_count() as u64 * channels as u64;
        if total > u32::MAX as u64 {
            return Err(ScaleError::Device(format!(
                "{}x{} output exceeds the shader's 32-bit index space",
                target.w, target.h
            )));
        }
        let words = total.div_ceil(4) as u32;
        let dst_bytes = words as u64 * 4;

        let mut src_bytes = src.data().to_vec();
        src_bytes.resize(src_bytes.len().div_ceil(4) * 4, 0);

        let largest = dst_bytes.max(src_bytes.len() as u64);
        if largest > self.max_binding_size {
            return Err(ScaleError::Device(format!(
                "buffer of {} bytes exceeds device binding limit of {} bytes",
                largest, self.max_binding_size
            )));
        }

        let groups = words.div_ceil(WORKGROUP_SIZE).max(1);
        let groups_x = groups.min(self.max_groups_per_dim);
        let groups_y = groups.div_ceil(groups_x);
        if groups_y > self.max_groups_per_dim {
            return Err(ScaleError::Device(format!(
                "dispatch of {} workgroups exceeds device limits",
                groups
            )));
        }

        let params = Params {
            src_width: geo.src.w,
            src_height: geo.src.h,
            dst_width: geo.dst.w,
            dst_height: geo.dst.h,
            channels,
            row_stride: groups_x * WORKGROUP_SIZE,
            scale_x: geo.scale_x,
            scale_y: geo.scale_y,
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bicubic-params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let source_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bicubic-source"),
            contents: &src_bytes,
            usage: wgpu::BufferUsages::STORAGE,
        });
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bicubic-output"),
            size: dst_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bicubic-readback"),
            size: dst_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bicubic-bind-group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: source_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("bicubic-encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("bicubic-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &readback_buffer, 0, dst_bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ScaleError::Device(err.to_string()));
        }

        let data = self.read_back(&readback_buffer, total as usize)?;
        Image::new(target.w, target.h, src.channels(), data)
    }
}

fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
