//! Process-wide settings shared by the Inky crates.

pub mod config;
