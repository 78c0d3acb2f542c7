//! Renderer-facing handles.
//!
//! Renderers own their GPU resources (pipelines, buffers) and record into the
//! frame's encoder through a [`RenderTarget`].

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
