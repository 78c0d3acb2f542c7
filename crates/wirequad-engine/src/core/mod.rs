//! Core engine-facing contracts.
//!
//! The interface between the runtime (platform loop) and the application.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
