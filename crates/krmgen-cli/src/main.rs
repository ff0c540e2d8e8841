mod cli;
mod output;
mod resource_list;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use krmgen_engine::{Engine, GeneratorSettings};
use output::{print_error, print_record};
use resource_list::ResourceList;

fn main() {
    if let Err(e) = run() {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let text = resource_list::read_input(cli.input.as_deref())?;
    let mut list = ResourceList::from_yaml(&text)?;
    let items = std::mem::take(&mut list.items);

    let engine = Engine::new(GeneratorSettings::default());
    let run = match cli.command {
        Commands::InjectRoutes => engine.inject_routes(list.require_function_config()?, items)?,
        Commands::Networking => {
            engine.synthesize_networking(list.require_function_config()?, items)?
        }
        Commands::Workloads => engine.synthesize_workloads(items)?,
    };

    for record in &run.results {
        print_record(record);
    }
    list.items = run.documents;
    list.results = run.results;

    resource_list::write_output(cli.output.as_deref(), &list.to_yaml()?)
}

fn init_tracing(level: &str) {
    // RUST_LOG wins over the flag; diagnostics go to stderr so stdout
    // stays a clean ResourceList stream.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
