//! アプリケーション設定管理モジュール
//!
//! モデルの場所やスキャフォールド設定をJSON形式で保存・読み込みします。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::ml::DEFAULT_MODEL_PATH;
use crate::scaffold::DEFAULT_PROJECT_NAME;

/// モデル設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// 使用するモデルファイルのパス
    pub model_path: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
        }
    }
}

/// スキャフォールド設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldSettings {
    /// `src/` 配下に作るパッケージ名
    pub project_name: String,
    /// 雛形を作成するディレクトリ
    pub root: String,
}

impl Default for ScaffoldSettings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            root: ".".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// モデル設定
    #[serde(default)]
    pub model: ModelSettings,
    /// スキャフォールド設定
    #[serde(default)]
    pub scaffold: ScaffoldSettings,
}

impl AppConfig {
    /// 設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 設定を読み込む、存在しない・読めない場合はデフォルト設定を返す
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config ({}): {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// 設定を保存する
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
