pub mod error;
pub mod http;
pub mod renderer;
pub mod telemetry;
