use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lrc_editor::app_settings::AppSettings;
use lrc_editor::error::{AppError, AppResult};
use lrc_editor::io::{read_lyric_file, write_lyric_file};
use lrc_editor::playback::{current_line, disordered_indices};
use lrc_editor::timestamp::{format_timestamp, parse_timestamp};
use lrc_editor::{BilingualLayout, logger};

/// 双语 LRC 歌词的命令行工具。
#[derive(Parser, Debug)]
#[command(
    version,
    about = "双语 LRC 歌词整理工具",
    long_about = "解析、规范化并检查双语 LRC 歌词文件。输出始终为 UTF-8。"
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 解析后按指定排版重新生成歌词。
    Normalize {
        input: PathBuf,
        /// 输出文件，省略时写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// separated 或 single_line，省略时使用配置文件中的设置
        #[arg(short, long)]
        layout: Option<BilingualLayout>,
    },
    /// 报告时间顺序错乱与缺少时间戳的行。
    Check { input: PathBuf },
    /// 查询某个播放位置对应的歌词行，位置可写成秒数或 mm:ss.cc。
    At { input: PathBuf, position: String },
    /// 以 JSON 输出解析结果。
    Dump { input: PathBuf },
    /// 写出当前配置并显示配置文件路径。
    Config,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let settings = AppSettings::load();
    logger::init_global_logger(&settings.log_settings);

    match run(args.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &AppSettings) -> AppResult<()> {
    match command {
        Command::Normalize {
            input,
            output,
            layout,
        } => normalize(
            &input,
            output.as_deref(),
            layout.unwrap_or(settings.editor_settings.bilingual_layout),
        ),
        Command::Check { input } => check(&input),
        Command::At { input, position } => at(&input, &position),
        Command::Dump { input } => {
            let document = read_lyric_file(&input)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        Command::Config => {
            settings.save()?;
            if let Some(path) = AppSettings::config_path() {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

fn normalize(input: &Path, output: Option<&Path>, layout: BilingualLayout) -> AppResult<()> {
    let document = read_lyric_file(input)?;
    match output {
        Some(path) => write_lyric_file(path, &document, layout),
        None => {
            println!("{}", lrc_editor::generate_lrc(&document, layout));
            Ok(())
        }
    }
}

fn check(input: &Path) -> AppResult<()> {
    let document = read_lyric_file(input)?;
    let disordered = disordered_indices(&document);
    let untimed: Vec<usize> = document
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.timestamp.is_none())
        .map(|(index, _)| index)
        .collect();

    println!("共 {} 行", document.lines.len());
    for index in &disordered {
        let line = &document.lines[*index];
        let time = line.timestamp.map(|ts| ts.to_string()).unwrap_or_default();
        println!("第 {} 行时间 {time} 早于前一行: {}", index + 1, line.original);
    }
    for index in &untimed {
        println!("第 {} 行没有时间戳: {}", index + 1, document.lines[*index].original);
    }

    if disordered.is_empty() && untimed.is_empty() {
        println!("未发现问题");
    }
    Ok(())
}

fn at(input: &Path, position: &str) -> AppResult<()> {
    let seconds = parse_timestamp(position)
        .or_else(|_| position.trim().parse::<f64>())
        .map_err(|_| AppError::Custom(format!("无法识别的播放位置: '{position}'")))?;

    let document = read_lyric_file(input)?;
    match current_line(&document, seconds) {
        Some(index) => {
            let line = &document.lines[index];
            println!(
                "[{}] 第 {} 行: {}",
                format_timestamp(seconds),
                index + 1,
                line.original
            );
            if !line.translated.is_empty() {
                println!("{}", line.translated);
            }
        }
        None => println!("[{}] 尚未到达任何歌词行", format_timestamp(seconds)),
    }
    Ok(())
}
