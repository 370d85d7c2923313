//! Command-line front end for the island generator.

mod app;
mod platform;

use std::process::ExitCode;

use clap::Parser;
use isle_config::CliArgs;

fn run(args: CliArgs) -> Result<(), app::AppError> {
    let dirs = platform::PlatformDirs::resolve()?;
    dirs.create_dirs()?;
    let loaded = app::load_config(&args, &dirs)?;
    isle_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&loaded.config));
    app::log_config_source(&loaded);
    let config = loaded.config;

    let outcome = app::execute(&config, &dirs)?;
    if config.output.print_report || args.json {
        println!("{}", app::render_report(&outcome, args.json)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("isle: {e}");
            ExitCode::FAILURE
        }
    }
}
