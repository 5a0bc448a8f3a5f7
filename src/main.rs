mod browser;
mod classifier;
mod cli;
mod error;
mod fmt;
mod models;
mod normalizer;
mod parse;
mod query;
mod session;
mod settings;
mod table;
mod tui;
mod views;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("playledger=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playledger=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if !settings::load_settings().color {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Summary { files } => cli::summary::run(&files),
        Commands::View {
            files,
            view,
            filter,
            search,
        } => cli::view::run(&files, view, &filter, &search),
        Commands::Total { files, projection } => cli::total::run(&files, projection),
        Commands::Export {
            files,
            view,
            filter,
            search,
            output,
        } => cli::export::run(&files, view, &filter, &search, &output),
        Commands::Browse { files } => cli::browse::run(&files),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "playledger", &mut std::io::stdout());
            Ok(())
        }
        Commands::Config {
            date_format,
            color,
            page_size,
            show,
        } => cli::config::run(date_format, color, page_size, show),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
