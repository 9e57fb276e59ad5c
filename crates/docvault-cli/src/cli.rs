use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docvault",
    about = "docvault: shared document storage with per-user visibility",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Show this file merged over the defaults instead of the bare defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["docvault", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "docvault",
            "serve",
            "--config",
            "docvault.toml",
            "--bind",
            "0.0.0.0:9000",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("docvault.toml")));
            assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn bad_bind_is_rejected() {
        assert!(Cli::try_parse_from(["docvault", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["docvault", "config"]).unwrap();
        assert!(matches!(cli.command, Command::Config(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["docvault", "--verbose", "serve"]).unwrap();
        assert!(cli.verbose);
        let cli = Cli::try_parse_from(["docvault", "config", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
