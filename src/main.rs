use clap::{CommandFactory, Parser};
use ridership_etl::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and exit cleanly
    if args.command.is_none() {
        if let Err(e) = Args::command().print_help() {
            eprintln!("Failed to print help: {}", e);
            process::exit(1);
        }
        println!();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = cli::run(args) => result,
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                match signal {
                    Ok(()) => Err(anyhow::anyhow!("Interrupted by user")),
                    Err(e) => Err(anyhow::Error::new(e).context("Failed to listen for CTRL+C")),
                }
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
