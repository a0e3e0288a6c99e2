//! モデル推論機能

use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::{backend::Backend, cast::ToElement},
};
use std::path::Path;
use tracing::debug;

use crate::ml::{
    load_image_tensor, KidneyClassifier, ModelConfig, CLASS_NAMES, IMAGE_SIZE, NUM_CLASSES,
};
use crate::model::{load_model_with_metadata, ModelMetadata};

/// 画像1枚からクラスインデックスを求める分類器
///
/// 推論パイプラインはこのトレイト越しにモデルを呼び出すため、
/// テストでは任意のインデックスを返す実装に差し替えられます。
pub trait ImageClassifier {
    fn predict_class_index(&self, image_path: &Path) -> Result<usize>;
}

/// 推論エンジン
pub struct InferenceEngine<B: Backend> {
    model: KidneyClassifier<B>,
    metadata: ModelMetadata,
    device: B::Device,
}

impl<B: Backend> InferenceEngine<B> {
    /// モデルを読み込んで推論エンジンを初期化
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::load_on(model_path, Default::default())
    }

    /// デバイスを指定してモデルを読み込む
    pub fn load_on<P: AsRef<Path>>(model_path: P, device: B::Device) -> Result<Self> {
        let model_path = model_path.as_ref();
        let (metadata, model_binary) = load_model_with_metadata(model_path)
            .with_context(|| format!("Failed to load model: {}", model_path.display()))?;
        validate_metadata(&metadata)?;

        let model = ModelConfig::new()
            .with_num_classes(metadata.class_labels.len())
            .with_hidden_size(metadata.hidden_size)
            .init::<B>(&device);

        // モデルの重みを復元
        let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
        let record = recorder
            .load(model_binary, &device)
            .map_err(|e| anyhow::anyhow!("Failed to restore model weights: {:?}", e))?;
        let model = model.load_record(record);

        debug!("Loaded model from {}", model_path.display());

        Ok(Self {
            model,
            metadata,
            device,
        })
    }

    /// 単一画像を分類してクラスインデックスを返す
    pub fn classify_image<P: AsRef<Path>>(&self, image_path: P) -> Result<usize> {
        let size = self.metadata.model_input_size as usize;
        let tensor = load_image_tensor::<B>(image_path.as_ref(), size, &self.device)?;

        let class_idx = self.model.predict(tensor).into_scalar().to_usize();
        debug!("Predicted class index: [{}]", class_idx);

        Ok(class_idx)
    }

    /// ModelMetadataへの参照を取得
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl<B: Backend> ImageClassifier for InferenceEngine<B> {
    fn predict_class_index(&self, image_path: &Path) -> Result<usize> {
        self.classify_image(image_path)
    }
}

/// アーカイブのメタデータが固定のクラス表・入力サイズと一致するか確認
fn validate_metadata(metadata: &ModelMetadata) -> Result<()> {
    if metadata.class_labels.len() != NUM_CLASSES {
        anyhow::bail!(
            "Model has {} classes, expected {}",
            metadata.class_labels.len(),
            NUM_CLASSES
        );
    }
    // ラベルの並びが違うと予測結果が別のクラス名で返ってしまう
    if metadata.class_labels != CLASS_NAMES {
        anyhow::bail!(
            "Model class labels [{}] do not match [{}]",
            metadata.class_labels.join(", "),
            CLASS_NAMES.join(", ")
        );
    }
    if metadata.model_input_size as usize != IMAGE_SIZE {
        anyhow::bail!(
            "Model input size is {}x{}, expected {}x{}",
            metadata.model_input_size,
            metadata.model_input_size,
            IMAGE_SIZE,
            IMAGE_SIZE
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_metadata() {
        let labels = CLASS_NAMES.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(validate_metadata(&ModelMetadata::new(labels.clone(), 224, 64)).is_ok());
        assert!(validate_metadata(&ModelMetadata::new(labels[..3].to_vec(), 224, 64)).is_err());
        assert!(validate_metadata(&ModelMetadata::new(labels, 48, 64)).is_err());
    }

    #[test]
    fn test_validate_metadata_rejects_reordered_labels() {
        let reordered = ["Tumor", "Stone", "Normal", "Cyst"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let err = validate_metadata(&ModelMetadata::new(reordered, 224, 64)).unwrap_err();
        assert!(err.to_string().contains("Tumor, Stone, Normal, Cyst"));
    }
}
