//! モデルメタデータの定義
//!
//! tar.gz形式のモデルアーカイブに `metadata.json` として格納されます。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// モデルメタデータ
///
/// tar.gz形式で保存される情報：
/// - metadata.json: このメタデータ（JSON形式）
/// - model.bin: モデルの重み（バイナリ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// クラスラベル（インデックス順）
    /// 例: ["Cyst", "Normal", "Stone", "Tumor"]
    pub class_labels: Vec<String>,

    /// モデル入力サイズ（正方形、通常224x224）
    pub model_input_size: u32,

    /// 全結合層の隠れ次元
    #[serde(default = "default_hidden_size")]
    pub hidden_size: usize,

    /// モデルの書き出し時刻（ISO8601形式）
    pub exported_at: String,
}

fn default_hidden_size() -> usize {
    64
}

impl ModelMetadata {
    /// 新しいメタデータを作成
    pub fn new(class_labels: Vec<String>, model_input_size: u32, hidden_size: usize) -> Self {
        let exported_at = chrono::Local::now().to_rfc3339();

        Self {
            class_labels,
            model_input_size,
            hidden_size,
            exported_at,
        }
    }

    /// メタデータをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize metadata to JSON")
    }

    /// JSON文字列からメタデータを生成
    pub fn from_json_string(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize metadata from JSON")
    }
}
