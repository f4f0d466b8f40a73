//! GPU side of the renderer.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `pipeline` compiles the aurora GLSL into a render pipeline with a single
//!   uniform bind group.
//! - `uniforms` mirrors the shader's parameter block.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   the window host.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
