//! 学習済みネットワークをモデルアーカイブへ書き出す

use anyhow::Result;
use burn::{
    module::Module,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::Backend,
};
use std::path::{Path, PathBuf};

use crate::ml::{KidneyClassifier, CLASS_NAMES, IMAGE_SIZE};
use crate::model::{save_model_with_metadata, ModelMetadata};

/// ネットワークの重みをメタデータと共に tar.gz に保存
///
/// 保存先のパスを返します。
pub fn export_model<B: Backend>(
    model: KidneyClassifier<B>,
    hidden_size: usize,
    output_path: &Path,
) -> Result<PathBuf> {
    // CompactRecorderはf16で保存してしまうためFullPrecisionを使用
    let recorder = BinBytesRecorder::<FullPrecisionSettings>::default();
    let model_binary = recorder
        .record(model.into_record(), ())
        .map_err(|e| anyhow::anyhow!("Failed to serialize model weights: {:?}", e))?;

    let metadata = ModelMetadata::new(
        CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        IMAGE_SIZE as u32,
        hidden_size,
    );

    save_model_with_metadata(output_path, &metadata, &model_binary)
}
