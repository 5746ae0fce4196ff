use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use moodscan_core::Plan;

#[derive(Parser, Debug)]
#[command(
    name = "moodscan",
    version,
    about = "Submit YouTube videos for emotion analysis and manage local history"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Analysis service base URL (overrides MOODSCAN_API_BASE_URL)
    #[arg(global = true, long)]
    pub base_url: Option<String>,
    /// Directory holding history.json (overrides MOODSCAN_DATA_DIR)
    #[arg(global = true, long)]
    pub data_dir: Option<PathBuf>,
    /// Also write logs to this file
    #[arg(global = true, long)]
    pub log_file: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a video for analysis and wait for the result
    Submit(SubmitArgs),
    /// Inspect or manage past submissions
    #[command(subcommand)]
    History(HistoryCommand),
    /// List the available plans
    Plans,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// YouTube video URL
    pub url: String,
    /// Plan forwarded to the service (basic, plus, pro)
    #[arg(long, default_value = "basic")]
    pub plan: Plan,
    /// Extra boolean request field, e.g. --flag translate=true
    #[arg(long = "flag", value_name = "NAME=BOOL", value_parser = parse_flag)]
    pub flags: Vec<(String, bool)>,
    /// Download the result artifact into this directory
    #[arg(long)]
    pub download_to: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Show stored submissions, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = moodscan_engine::DEFAULT_PAGE_SIZE)]
        per_page: usize,
        /// Print the page as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Remove all stored submissions
    Clear,
    /// Write all stored submissions to a CSV file
    Export {
        /// Output file (defaults to ./moodscan-history-<date>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_flag(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=BOOL, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("flag name must not be empty".to_string());
    }
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        other => return Err(format!("'{other}' is not a boolean")),
    };
    Ok((name.to_string(), value))
}
