use chrono::Local;
use directories::ProjectDirs;
use fern::Dispatch;
use std::fs;
use std::path::PathBuf;

use crate::app_settings::LogSettings;

fn get_log_file_path() -> Result<PathBuf, String> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "LrcEditor", "LrcEditor") {
        let log_dir = proj_dirs.data_local_dir();
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)
                .map_err(|e| format!("无法创建日志目录 {log_dir:?}: {e}"))?;
        }
        Ok(log_dir.join("lrc_editor.log"))
    } else {
        let current_dir_log_path = PathBuf::from("lrc_editor.log");
        eprintln!("无法获取项目日志目录，将尝试在当前目录创建日志: {current_dir_log_path:?}");
        Ok(current_dir_log_path)
    }
}

/// 初始化全局日志。控制台输出写到标准错误，不与命令输出混在一起。
///
/// 重复调用时只打印提示，不会覆盖已安装的日志器。
pub fn init_global_logger(settings: &LogSettings) {
    let console_dispatch = Dispatch::new()
        .level(settings.console_log_level)
        .chain(std::io::stderr());

    let mut final_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
                record.level(),
                message
            ));
        })
        .level(std::cmp::max(
            settings.console_log_level,
            if settings.enable_file_log {
                settings.file_log_level
            } else {
                log::LevelFilter::Off
            },
        ))
        .chain(console_dispatch);

    let mut log_file_path = None;
    if settings.enable_file_log {
        match get_log_file_path().and_then(|path| {
            fern::log_file(&path)
                .map(|file| (path.clone(), file))
                .map_err(|e| format!("无法打开日志文件 {path:?}: {e}"))
        }) {
            Ok((path, log_file)) => {
                final_dispatch = final_dispatch.chain(
                    Dispatch::new()
                        .level(settings.file_log_level)
                        .chain(log_file),
                );
                log_file_path = Some(path);
            }
            Err(e) => {
                eprintln!("{e}。文件日志将被禁用。");
            }
        }
    }

    if let Err(e) = final_dispatch.apply() {
        eprintln!("日志记录器初始化失败: {e}");
    } else if let Some(path) = log_file_path {
        log::info!("日志记录器已初始化。日志路径: {path:?}");
    } else {
        log::debug!("日志记录器已初始化，文件日志未启用。");
    }
}
