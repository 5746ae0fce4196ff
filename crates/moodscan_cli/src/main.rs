use std::process::ExitCode;

use clap::Parser;
use moodscan_logging::LogDestination;

mod app;
mod cli;
mod config;
mod effects;
mod history_cmd;
mod render;

use app::SubmitOutcome;
use cli::{Cli, Command};
use config::AppConfig;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::resolve(&cli.global);
    init_logging(&config);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<ExitCode> {
    match command {
        Command::Submit(args) => {
            let outcome = app::run_submit(config, args)?;
            Ok(match outcome {
                SubmitOutcome::Succeeded => ExitCode::SUCCESS,
                SubmitOutcome::Failed => ExitCode::FAILURE,
                SubmitOutcome::Rejected => ExitCode::from(2),
            })
        }
        Command::History(command) => {
            history_cmd::run(config, command)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Plans => {
            for line in render::plan_lines() {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(config: &AppConfig) {
    moodscan_logging::initialize(log_destination(config), config.log_level);
}

fn log_destination(config: &AppConfig) -> LogDestination {
    match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use log::LevelFilter;

    use super::*;

    fn config(log_file: Option<PathBuf>) -> AppConfig {
        AppConfig {
            base_url: "http://127.0.0.1:8000".into(),
            data_dir: PathBuf::from("data"),
            log_file,
            log_level: LevelFilter::Warn,
        }
    }

    #[test]
    fn log_file_is_added_to_terminal_output() {
        assert_eq!(
            log_destination(&config(Some(PathBuf::from("moodscan.log")))),
            LogDestination::Both(PathBuf::from("moodscan.log"))
        );
        assert_eq!(log_destination(&config(None)), LogDestination::Terminal);
    }
}
