//! `serve` subcommand — the daemon.

use std::sync::Arc;

use super::{Config, Result, open_core};
use shieldlights_lib::LightsError;
use shieldlights_lib::host::ServiceHost;

pub(super) fn cmd_serve(config: Config) -> Result<()> {
    let core = open_core(&config)?;
    let summary = core.summary();
    log::info!(
        "power led: {:?}, lights: {}",
        summary.power_led,
        summary.lights.len()
    );

    let host = ServiceHost::new(config.service_name(), Arc::new(core), config.worker_threads);
    let stdin = std::io::stdin();
    host.serve(stdin.lock(), std::io::stdout())?;

    // The request loop is meant to run for the life of the process.
    Err(LightsError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("{} request stream closed", host.name()),
    )))
}
