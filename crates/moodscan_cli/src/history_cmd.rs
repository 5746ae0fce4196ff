use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::Local;
use moodscan_engine::{
    export_csv_file, export_filename, paginate, HistoryError, HistoryRecorder, JsonFileStore,
};

use crate::cli::HistoryCommand;
use crate::config::AppConfig;
use crate::render::history_lines;

pub fn run(config: &AppConfig, command: HistoryCommand) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config.data_dir.clone());
    let store_path = store.path();
    let recorder = HistoryRecorder::new(store);

    match command {
        HistoryCommand::List {
            page,
            per_page,
            json,
        } => {
            let entries = recorder.list().map_err(|err| explain(err, &store_path))?;
            let page = paginate(&entries, page, per_page);
            if json {
                println!("{}", serde_json::to_string_pretty(page.items)?);
            } else {
                for line in history_lines(&page) {
                    println!("{line}");
                }
            }
        }
        HistoryCommand::Clear => {
            recorder
                .clear()
                .with_context(|| format!("clearing {}", store_path.display()))?;
            println!("History cleared.");
        }
        HistoryCommand::Export { out } => {
            let entries = recorder.list().map_err(|err| explain(err, &store_path))?;
            let (dir, filename) = export_target(out, Local::now().date_naive())?;
            let path = export_csv_file(&entries, &dir, &filename)
                .with_context(|| format!("exporting history to {}", dir.display()))?;
            println!("Exported {} entries to {}", entries.len(), path.display());
        }
    }
    Ok(())
}

fn explain(err: HistoryError, path: &Path) -> anyhow::Error {
    match err {
        HistoryError::Corrupt(_) => anyhow!(
            "{err} (file: {}); run `moodscan history clear` to reset it",
            path.display()
        ),
        other => anyhow::Error::new(other).context(format!("reading {}", path.display())),
    }
}

fn export_target(
    out: Option<PathBuf>,
    day: chrono::NaiveDate,
) -> anyhow::Result<(PathBuf, String)> {
    let Some(out) = out else {
        return Ok((PathBuf::from("."), export_filename(day)));
    };
    let filename = out
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid export path {}", out.display()))?
        .to_string();
    let dir = out
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, filename))
}
