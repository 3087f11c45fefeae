//! GPU rendition of a shading program.
//!
//! - `context` owns instance, adapter and device wiring plus window surfaces.
//! - `pipeline` turns a program's GLSL into a render pipeline with one
//!   uniform bind group.
//! - `uniforms` mirrors the std140 block the fragment stage declares.
//! - `state` drives an interactive window surface.
//! - `offscreen` renders to a texture and reads the pixels back for export.

mod context;
mod offscreen;
mod pipeline;
mod state;
mod uniforms;

pub use offscreen::GpuOffscreen;
pub(crate) use state::GpuState;
