//! Relay server, page agent and command line for cdp-bridge.

pub mod agent;
pub mod cli;
pub mod commands;
pub mod demo;
pub mod error;
pub mod logging;
pub mod relay;
