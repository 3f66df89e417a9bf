use bytemuck::{Pod, Zeroable};
use delta_life::{Cell, ChangeSet, Grid};
use std::num::NonZeroU64;

/// Bytes per cell in the GPU cell buffer.
pub const CELL_BYTES: u64 = std::mem::size_of::<u32>() as u64;

/// Beyond this share of changed cells a full upload beats per-cell writes.
const FULL_UPLOAD_DIVISOR: usize = 8;

// Uniforms specific to rendering
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct RenderParams {
    pub grid_width: u32,
    pub grid_height: u32,
    pub cell_size: u32,
    pub _padding: u32, // Ensure 16-byte alignment
}

impl RenderParams {
    pub fn new(grid_width: usize, grid_height: usize, cell_size: u32) -> Self {
        Self {
            grid_width: grid_width as u32,
            grid_height: grid_height as u32,
            cell_size,
            _padding: 0,
        }
    }
}

/// GPU representation of every cell, row-major.
pub fn cell_values(grid: &Grid) -> Vec<u32> {
    grid.cells().iter().map(|cell| u32::from(cell.value())).collect()
}

/// Whether `changes` is large enough to re-upload the whole grid instead.
pub fn prefers_full_upload(changes: &ChangeSet, grid: &Grid) -> bool {
    changes.len() > grid.cells().len() / FULL_UPLOAD_DIVISOR
}

/// Byte offset of `(row, col)` in the cell buffer.
pub fn cell_offset(row: usize, col: usize, width: usize) -> u64 {
    (row * width + col) as u64 * CELL_BYTES
}

pub fn cell_word(cell: Cell) -> u32 {
    u32::from(cell.value())
}

pub fn create_render_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Render Bind Group Layout"),
        entries: &[
            // RenderParams Uniform (Binding 0)
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<RenderParams>() as u64),
                },
                count: None,
            },
            // Cell Buffer (Binding 1)
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

pub fn create_render_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    render_param_buffer: &wgpu::Buffer,
    cell_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Render Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: render_param_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: cell_buffer.as_entire_binding() },
        ],
    })
}
