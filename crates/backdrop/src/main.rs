mod cli;
mod export;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let loaded = run::load_settings(cli.config.as_deref())?;
    match cli.command {
        Some(Command::Window(args)) => run::run_window(&args, loaded),
        Some(Command::Still(args)) => run::run_still(&args, loaded),
        Some(Command::Frames(args)) => run::run_frames(&args, loaded),
        Some(Command::Config(args)) => run::run_config(&args, loaded),
        None => run::run_window(&cli.window, loaded),
    }
}
