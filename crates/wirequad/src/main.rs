mod app;
mod rotation;
mod square;

use anyhow::Result;
use wirequad_engine::device::GpuInit;
use wirequad_engine::logging::{init_logging, LoggingConfig};
use wirequad_engine::window::{Runtime, RuntimeConfig};

use app::SpinApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("left/right arrow keys rotate the square");

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), SpinApp::new())?;

    log::info!("shutting down");
    Ok(())
}
