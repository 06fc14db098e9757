//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod compare;
pub mod config;
pub mod hex_utils;
pub mod hexdump;
pub mod monitor;
