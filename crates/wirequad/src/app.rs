use wirequad_engine::core::{App, AppControl, FrameCtx};
use wirequad_engine::input::Key;

use crate::rotation::Rotation;
use crate::square::SquareRenderer;

/// Rotating wireframe square driven by the arrow keys.
#[derive(Default)]
pub struct SpinApp {
    rotation: Rotation,
    square: SquareRenderer,
}

impl SpinApp {
    pub fn new() -> Self {
        Self {
            rotation: Rotation::new(),
            square: SquareRenderer::new(),
        }
    }
}

impl App for SpinApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.rotation.update(
            ctx.input.key_down(Key::ArrowLeft),
            ctx.input.key_down(Key::ArrowRight),
            ctx.time.dt,
        );

        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            self.square.render(rctx, target, &self.rotation);
        })
    }
}
