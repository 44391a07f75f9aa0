mod cli;
mod logging;

use std::process::ExitCode;

use playbridge_core::{BridgeConfig, Dispatcher};
use playbridge_messaging::Channel;
use tracing::{debug, error, info, warn};

use crate::cli::Cli;

fn main() -> ExitCode {
    let (cli, cli_error) = Cli::parse_lenient();

    // The browser is waiting for an acknowledgement, so a broken config
    // degrades to the defaults instead of aborting.
    let (config, config_error) = match BridgeConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (BridgeConfig::default(), Some(e)),
    };

    let _log_guard = logging::init(&config.logging);

    if let Some(e) = cli_error {
        warn!(error = %e, "Ignoring unparseable arguments");
    }
    if let Some(e) = config_error {
        warn!(error = %e, "Using default config");
    }
    debug!(browser_args = ?cli.browser_args, "Host started");

    let dispatcher = Dispatcher::from_config(config);
    let mut channel = Channel::stdio();
    match dispatcher.run(&mut channel) {
        Ok(strategy) => {
            info!(%strategy, "Play request dispatched");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Play request failed");
            ExitCode::FAILURE
        }
    }
}
