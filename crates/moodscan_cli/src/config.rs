use std::path::PathBuf;

use directories::ProjectDirs;
use log::LevelFilter;
use moodscan_engine::DEFAULT_BASE_URL;

use crate::cli::GlobalArgs;

pub const BASE_URL_ENV: &str = "MOODSCAN_API_BASE_URL";
pub const DATA_DIR_ENV: &str = "MOODSCAN_DATA_DIR";

/// Base URL baked in at compile time, if the build environment set one.
const BUILD_BASE_URL: Option<&str> = option_env!("MOODSCAN_API_BASE_URL");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl AppConfig {
    /// Flags win over the runtime environment, which wins over build-time defaults.
    pub fn resolve(global: &GlobalArgs) -> Self {
        Self::resolve_with(global, |key| std::env::var(key).ok(), default_data_dir)
    }

    fn resolve_with(
        global: &GlobalArgs,
        env: impl Fn(&str) -> Option<String>,
        fallback_data_dir: impl FnOnce() -> PathBuf,
    ) -> Self {
        let non_empty = |value: String| {
            let trimmed = value.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        };

        let base_url = global
            .base_url
            .clone()
            .and_then(non_empty)
            .or_else(|| env(BASE_URL_ENV).and_then(non_empty))
            .or_else(|| BUILD_BASE_URL.map(str::to_owned).and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let data_dir = global
            .data_dir
            .clone()
            .or_else(|| env(DATA_DIR_ENV).and_then(non_empty).map(PathBuf::from))
            .unwrap_or_else(fallback_data_dir);

        Self {
            base_url,
            data_dir,
            log_file: global.log_file.clone(),
            log_level: level_for(global.verbose),
        }
    }
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "moodscan")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".moodscan"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn fallback() -> PathBuf {
        PathBuf::from("/fallback")
    }

    #[test]
    fn flag_beats_environment() {
        let global = GlobalArgs {
            base_url: Some("http://flag:1".into()),
            ..GlobalArgs::default()
        };
        let config = AppConfig::resolve_with(
            &global,
            |key| (key == BASE_URL_ENV).then(|| "http://env:2".to_string()),
            fallback,
        );
        assert_eq!(config.base_url, "http://flag:1");
    }

    #[test]
    fn environment_beats_default() {
        let config = AppConfig::resolve_with(
            &GlobalArgs::default(),
            |key| match key {
                BASE_URL_ENV => Some("http://env:2".to_string()),
                DATA_DIR_ENV => Some("/env/data".to_string()),
                _ => None,
            },
            fallback,
        );
        assert_eq!(config.base_url, "http://env:2");
        assert_eq!(config.data_dir, PathBuf::from("/env/data"));
    }

    #[test]
    fn blank_values_fall_through() {
        let global = GlobalArgs {
            base_url: Some("  ".into()),
            ..GlobalArgs::default()
        };
        let config = AppConfig::resolve_with(&global, |_| Some(String::new()), fallback);
        let expected = BUILD_BASE_URL
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        assert_eq!(config.base_url, expected.trim());
        assert_eq!(config.data_dir, fallback());
    }

    #[test]
    fn verbosity_maps_to_levels() {
        let global = GlobalArgs {
            verbose: 2,
            ..GlobalArgs::default()
        };
        let config = AppConfig::resolve_with(&global, no_env, fallback);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.data_dir, fallback());
    }
}
