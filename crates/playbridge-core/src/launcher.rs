use tracing::info;

use crate::error::BridgeError;
use crate::plan::LaunchPlan;

/// Starts the process a [`LaunchPlan`] describes, without waiting on it.
pub trait Launcher {
    fn launch(&self, plan: LaunchPlan) -> Result<(), BridgeError>;
}

/// Spawns a real, detached child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, plan: LaunchPlan) -> Result<(), BridgeError> {
        // The child handle is dropped right away; dropping does not kill it.
        let child = plan.command().spawn().map_err(|source| BridgeError::Spawn {
            program: plan.executable.to_string_lossy().into_owned(),
            source,
        })?;
        info!(
            pid = child.id(),
            program = %plan.executable.to_string_lossy(),
            strategy = %plan.strategy,
            "Launched player"
        );
        Ok(())
    }
}
