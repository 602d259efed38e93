//! CLI module - Command-line interface for tenantry
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// tenantry - multi-tenant account service
/// User accounts, per-user workspaces and an admin panel
#[derive(Parser)]
#[command(name = "tenantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    #[command(alias = "daemon")]
    Serve,

    /// Create the default config file and initialize the auth database
    Init,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users
    #[command(alias = "ls")]
    List,
    /// Create a user
    Add {
        /// Username (also names the user's workspace file)
        username: String,
        /// Initial password
        #[arg(long)]
        password: String,
        /// Grant administrator rights
        #[arg(long)]
        admin: bool,
    },
    /// Block or unblock a user
    Block {
        /// User ID
        id: i32,
    },
    /// Permanently delete a user
    #[command(alias = "rm")]
    Remove {
        /// User ID
        id: i32,
    },
}

pub use commands::*;
