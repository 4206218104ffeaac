use clap::{Parser, Subcommand};

/// CLI surface definition. One credential, a handful of verbs.
#[derive(Parser, Debug)]
#[command(
    name = "lockbox",
    about = "Passphrase-sealed credential store for the admin console",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Manage the stored session token.
    #[command(subcommand)]
    Token(TokenCommand),
    /// Run a health check of the encrypted store (derive, seal, open).
    Health,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version and exit.
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TokenCommand {
    /// Encrypt and store a session token.
    Set { token: String },
    /// Print the stored token, falling back to the legacy plaintext entry.
    Get,
    /// Remove the stored token (encrypted and legacy entries).
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
