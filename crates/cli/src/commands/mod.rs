//! Subcommand implementations.

pub mod account;
pub mod catalog;
pub mod shop;
