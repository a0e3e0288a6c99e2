//! 画像1枚を分類して結果をJSONで出力する

use clap::Parser;
use cnn_classifier_lib::logging::enable_logging;
use cnn_classifier_lib::model::{load_metadata, print_metadata_info, AppConfig};
use cnn_classifier_lib::PredictionPipeline;
use std::path::PathBuf;

#[derive(Parser, Clone)]
#[command(about = "Classify a kidney CT image as Cyst, Normal, Stone or Tumor")]
struct Cli {
    /// 分類する画像ファイル
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// モデルアーカイブ（設定ファイルより優先）
    #[arg(short = 'm', long = "model", value_name = "MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// 予測の前にモデルメタデータを表示
    #[arg(long = "show-model")]
    show_model: bool,

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
    let model_path = cli
        .model_path
        .unwrap_or_else(|| PathBuf::from(&config.model.model_path));

    if cli.show_model {
        print_metadata_info(&load_metadata(&model_path)?);
    }

    let predictions = PredictionPipeline::new(cli.image).predict_from(&model_path)?;
    println!("{}", serde_json::to_string(&predictions)?);

    Ok(())
}
