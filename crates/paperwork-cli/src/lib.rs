//! paperwork-cli library root.
//!
//! Exposes the config, catalogue and command helpers so integration tests can
//! drive them without going through argument parsing.

pub mod catalog;
pub mod commands;
pub mod config;
