//! Objgate command-line tool
//!
//! Runs a gateway server exposing the standard host classes, and inspects
//! those classes offline.

mod commands;
mod telemetry;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "objgate")]
#[command(about = "Object gateway server", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway server
    Serve {
        /// Configuration file (objgate.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Address to listen on
        #[arg(long)]
        address: Option<String>,
        /// Port to listen on (0 picks a free port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Shared secret clients must present
        #[arg(long)]
        auth_token: Option<String>,
    },

    /// List registered classes
    Classes {
        /// Only classes in this package or below
        #[arg(long)]
        package: Option<String>,
    },

    /// Print the help page of a class
    Help {
        /// Class name, fully qualified or imported by default
        class: String,
        /// Only members whose signature matches this pattern
        #[arg(long)]
        pattern: Option<String>,
        /// Print simple type names
        #[arg(short, long)]
        short: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            address,
            port,
            auth_token,
        } => {
            let options = commands::serve::ServeOptions {
                config,
                address,
                port,
                auth_token,
                verbosity: cli.verbose,
            };
            commands::serve::execute(options)
        }

        Commands::Classes { package } => {
            telemetry::init(cli.verbose, None);
            commands::classes::execute(package.as_deref())
        }

        Commands::Help {
            class,
            pattern,
            short,
        } => {
            telemetry::init(cli.verbose, None);
            commands::help::execute(&class, pattern.as_deref(), short)
        }
    }
}
