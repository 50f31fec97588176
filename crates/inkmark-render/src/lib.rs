//! Inkmark Render Library
//!
//! Repaints the transient annotation overlay on top of a rendered page.
//! Every frame is recorded into a display list first; the default Vello
//! backend encodes that list for the GPU.

mod renderer;
mod scene;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{OverlayRenderer, OverlayStyle, RenderContext, Renderer};
pub use scene::{OverlayScene, OverlaySurface, PaintCommand};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
