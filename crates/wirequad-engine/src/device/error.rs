/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}

impl SurfaceErrorAction {
    /// `drawable` is false while the surface has zero area (minimized); a lost
    /// or outdated surface cannot be reconfigured then, so the frame is skipped.
    pub(crate) fn for_error(err: &wgpu::SurfaceError, drawable: bool) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated if drawable => {
                Self::Reconfigured
            }
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::SkipFrame,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}
