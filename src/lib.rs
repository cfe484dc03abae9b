pub mod backend;
pub mod certificates;
pub mod config;
pub mod saml;
pub mod session;
pub mod telemetry;
