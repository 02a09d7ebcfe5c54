//! CLI module for devsetup - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
