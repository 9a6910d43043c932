//! Command line surface.
//!
//! Without a subcommand `tunedeck` opens the listener view. The remaining
//! subcommands are one-shot: session management and the admin catalog tools.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tunedeck")]
#[command(about = "Terminal music catalog and player", long_about = None)]
pub struct Cli {
    /// Configuration file path (overrides `TUNEDECK_CONFIG_PATH`).
    #[arg(short, long, global = true, env = "TUNEDECK_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an admin session
    Login {
        /// Account email
        email: String,
        /// Display name shown by `whoami`
        #[arg(short, long)]
        name: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage song records (admins only)
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List song records
    List,
    /// Add a song record to the catalog
    Upload(UploadArgs),
    /// Delete a song record by id
    Delete {
        /// Song id as printed by `admin list`
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Song title
    #[arg(short, long)]
    pub title: String,
    /// Artist name
    #[arg(short, long)]
    pub artist: String,
    /// Audio URL or file path
    #[arg(long)]
    pub audio: String,
    /// Cover image URL
    #[arg(long)]
    pub cover: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_listener_view() {
        let cli = Cli::try_parse_from(["tunedeck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn upload_parses_required_and_optional_fields() {
        let cli = Cli::try_parse_from([
            "tunedeck",
            "admin",
            "upload",
            "--title",
            "Song",
            "--artist",
            "Band",
            "--audio",
            "https://cdn.example.com/song.mp3",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Admin(AdminCommand::Upload(args))) => {
                assert_eq!(args.title, "Song");
                assert_eq!(args.artist, "Band");
                assert_eq!(args.audio, "https://cdn.example.com/song.mp3");
                assert!(args.cover.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn upload_without_audio_is_rejected() {
        let res = Cli::try_parse_from(["tunedeck", "admin", "upload", "-t", "Song", "-a", "Band"]);
        assert!(res.is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["tunedeck", "whoami", "--config", "/tmp/t.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(cli.command, Some(Command::Whoami)));
    }
}
