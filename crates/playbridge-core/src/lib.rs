pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod launcher;
pub mod locate;
pub mod plan;
pub mod platform;
pub mod probe;

pub use config::BridgeConfig;
pub use dispatcher::{Dispatcher, HostEnvironment, ACKNOWLEDGEMENT};
pub use error::BridgeError;
pub use plan::{LaunchPlan, Strategy};
