//! Configuration for the vector gateway.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::GatewayConfig;
