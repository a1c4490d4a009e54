use directories::ProjectDirs;
use ini::Ini;
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::playback::DEFAULT_POLL_INTERVAL_MS;
use crate::types::BilingualLayout;

const LOGGING_SECTION: &str = "Logging";
const EDITOR_SECTION: &str = "Editor";

/// 快进/快退的默认步长
pub const DEFAULT_SEEK_STEP_MS: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub enable_file_log: bool,
    pub file_log_level: LevelFilter,
    pub console_log_level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_file_log: false,
            file_log_level: LevelFilter::Info,
            console_log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// 保存时使用的双语排版
    pub bilingual_layout: BilingualLayout,
    pub history_limit: usize,
    pub poll_interval_ms: u64,
    pub seek_step_ms: i64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            bilingual_layout: BilingualLayout::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            seek_step_ms: DEFAULT_SEEK_STEP_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub log_settings: LogSettings,
    pub editor_settings: EditorSettings,
}

/// 读取某个键并解析，缺失或无法解析时返回 `None`。
fn read_value<T: FromStr>(conf: &Ini, section: &str, key: &str) -> Option<T> {
    let raw = conf.section(Some(section)).and_then(|s| s.get(key))?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("配置项 [{section}] {key} = '{raw}' 无法解析，使用默认值。");
            None
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "LrcEditor", "LrcEditor") {
            let config_dir = proj_dirs.data_local_dir();
            if !config_dir.exists() {
                if let Err(e) = fs::create_dir_all(config_dir) {
                    log::error!("无法创建配置目录 {config_dir:?}: {e}");
                    return None;
                }
            }
            Some(config_dir.join("lrc_editor.ini"))
        } else {
            log::error!("无法获取项目配置目录路径。");
            None
        }
    }

    /// 从默认位置加载配置。任何失败都退回默认配置，文件不存在时写出一份默认配置。
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            log::info!("配置文件 {path:?} 未找到。将创建并使用默认配置。");
            let default_settings = Self::default();
            if default_settings.save_to(&path).is_err() {
                log::error!("无法保存初始默认配置文件到 {path:?}。");
            }
            return default_settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("加载配置文件 {path:?} 失败: {e}。将使用默认配置。");
                Self::default()
            }
        }
    }

    /// 从指定文件加载。缺失或无效的键使用默认值。
    pub fn load_from(path: &Path) -> Result<Self, ini::Error> {
        let conf = Ini::load_from_file(path)?;
        let log_defaults = LogSettings::default();
        let editor_defaults = EditorSettings::default();

        let log_settings = LogSettings {
            enable_file_log: read_value(&conf, LOGGING_SECTION, "EnableFileLog")
                .unwrap_or(log_defaults.enable_file_log),
            file_log_level: read_value(&conf, LOGGING_SECTION, "FileLogLevel")
                .unwrap_or(log_defaults.file_log_level),
            console_log_level: read_value(&conf, LOGGING_SECTION, "ConsoleLogLevel")
                .unwrap_or(log_defaults.console_log_level),
        };

        let editor_settings = EditorSettings {
            bilingual_layout: read_value(&conf, EDITOR_SECTION, "BilingualLayout")
                .unwrap_or(editor_defaults.bilingual_layout),
            history_limit: read_value::<usize>(&conf, EDITOR_SECTION, "HistoryLimit")
                .unwrap_or(editor_defaults.history_limit)
                .max(1),
            poll_interval_ms: read_value::<u64>(&conf, EDITOR_SECTION, "PollIntervalMs")
                .unwrap_or(editor_defaults.poll_interval_ms)
                .max(1),
            seek_step_ms: read_value(&conf, EDITOR_SECTION, "SeekStepMs")
                .unwrap_or(editor_defaults.seek_step_ms),
        };

        log::info!("从 {path:?} 加载配置成功。");
        Ok(Self {
            log_settings,
            editor_settings,
        })
    }

    pub fn save(&self) -> Result<(), ini::Error> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)
        } else {
            let err_msg = "无法确定配置文件路径，保存失败。".to_string();
            log::error!("{err_msg}");
            Err(ini::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                err_msg,
            )))
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ini::Error> {
        let mut conf = Ini::new();
        let log = &self.log_settings;
        conf.with_section(Some(LOGGING_SECTION))
            .set("EnableFileLog", log.enable_file_log.to_string())
            .set("FileLogLevel", log.file_log_level.to_string())
            .set("ConsoleLogLevel", log.console_log_level.to_string());

        let editor = &self.editor_settings;
        conf.with_section(Some(EDITOR_SECTION))
            .set("BilingualLayout", editor.bilingual_layout.to_string())
            .set("HistoryLimit", editor.history_limit.to_string())
            .set("PollIntervalMs", editor.poll_interval_ms.to_string())
            .set("SeekStepMs", editor.seek_step_ms.to_string());

        match conf.write_to_file(path) {
            Ok(()) => {
                log::info!("配置已保存到 {path:?}");
                Ok(())
            }
            Err(write_error) => {
                log::error!("保存配置到 {path:?} 失败: {write_error}");
                Err(ini::Error::Io(write_error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");

        let settings = AppSettings {
            log_settings: LogSettings {
                enable_file_log: true,
                file_log_level: LevelFilter::Debug,
                console_log_level: LevelFilter::Warn,
            },
            editor_settings: EditorSettings {
                bilingual_layout: BilingualLayout::SingleLine,
                history_limit: 25,
                poll_interval_ms: 50,
                seek_step_ms: 5000,
            },
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_or_invalid_keys_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ini");
        fs::write(
            &path,
            "[Logging]\nConsoleLogLevel=nonsense\n[Editor]\nBilingualLayout=single_line\nHistoryLimit=0\n",
        )
        .unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.log_settings, LogSettings::default());
        assert_eq!(
            loaded.editor_settings.bilingual_layout,
            BilingualLayout::SingleLine
        );
        assert_eq!(loaded.editor_settings.history_limit, 1);
        assert_eq!(loaded.editor_settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppSettings::load_from(&dir.path().join("none.ini")).is_err());
    }
}
