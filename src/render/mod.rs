//! Rendering: frame buffers, near-plane clipping, rasterization and the
//! [`Renderer`] that drives them.

mod clipper;
pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;

pub use clipper::{clip_near, NearClip};
pub use framebuffer::FrameBuffer;
pub use rasterizer::{FrameStats, RasterState, Rasterizer};
pub use renderer::{RenderOptions, Renderer};
