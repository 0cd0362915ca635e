//! Relay binary: command line, configuration and the stdin relay

pub mod cli;
pub mod error;
pub mod relay;
pub mod startup;
