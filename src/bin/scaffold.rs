//! MLプロジェクトの雛形（空ファイル群）を作成する

use clap::Parser;
use cnn_classifier_lib::logging::enable_logging;
use cnn_classifier_lib::model::AppConfig;
use cnn_classifier_lib::{ExistingFilePolicy, Scaffold};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Clone)]
#[command(about = "Create the empty file layout of an ML project")]
struct Cli {
    /// 雛形を作成するディレクトリ（設定ファイルより優先）
    #[arg(short = 'r', long = "root", value_name = "DIR")]
    root: Option<PathBuf>,

    /// `src/` 配下のパッケージ名（設定ファイルより優先）
    #[arg(short = 'p', long = "project-name", value_name = "NAME")]
    project_name: Option<String>,

    /// 既存ファイルを空にせず残す
    #[arg(long = "keep-existing")]
    keep_existing: bool,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "CONFIG_PATH",
        default_value = "config.json",
        help = "Configuration file path"
    )]
    config_path: PathBuf,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v for debug, -vv for trace)"
    )]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    enable_logging(cli.verbose);

    let config = AppConfig::load_or_default(&cli.config_path);
    let root = cli.root.unwrap_or_else(|| PathBuf::from(&config.scaffold.root));
    let project_name = cli.project_name.unwrap_or(config.scaffold.project_name);

    let policy = if cli.keep_existing {
        ExistingFilePolicy::Keep
    } else {
        ExistingFilePolicy::Truncate
    };

    let report = Scaffold::new(&project_name).with_policy(policy).generate(&root)?;
    if !report.truncated.is_empty() {
        warn!(
            "{} existing file(s) were emptied; rerun with --keep-existing to preserve them",
            report.truncated.len()
        );
    }

    Ok(())
}
