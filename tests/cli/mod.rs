pub mod configuration;
pub mod relay;
