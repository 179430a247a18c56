//! # Nabu CLI
//!

mod commands;

use clap::{Parser, Subcommand};
use commands::{guides::GuidesArgs, reflect::ReflectArgs};
use nabu_reflection::{log_info, logging};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "nabu", version, about = "PHP reflection and incremental guide builds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reflect PHP sources into XML or JSON descriptors
    Reflect(ReflectArgs),
    /// Build RST guides, re-parsing only what changed
    Guides(GuidesArgs),
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    logging::init_global_logging()?;

    let cli = Cli::parse();
    log_info!("Nabu starting", "version" => env!("CARGO_PKG_VERSION"));

    let success = match cli.command {
        Command::Reflect(args) => commands::reflect::run(&args)?,
        Command::Guides(args) => commands::guides::run(&args)?,
    };

    eprint!("{}", logging::cargo_style_summary());
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["nabu", "reflect", "src/", "--format", "json", "--threads", "2"]).unwrap();
        assert!(matches!(cli.command, Command::Reflect(_)));

        let cli = Cli::try_parse_from(["nabu", "guides", "docs", "--meta", "cache/meta.json"]).unwrap();
        assert!(matches!(cli.command, Command::Guides(_)));

        assert!(Cli::try_parse_from(["nabu", "unknown"]).is_err());
    }
}
