//! 単一画像の予測パイプライン

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ml::{class_index_to_label, ImageClassifier, InferenceEngine};

/// 既定のモデルアーカイブの場所（カレントディレクトリからの相対パス）
pub const DEFAULT_MODEL_PATH: &str = "model/model.tar.gz";

/// 推論に使うバックエンド
#[cfg(not(feature = "wgpu"))]
pub type DefaultBackend = burn::backend::NdArray;
#[cfg(feature = "wgpu")]
pub type DefaultBackend = burn::backend::Wgpu;

/// 予測結果（`{"image": "<label>"}` としてシリアライズされる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub image: String,
}

/// 画像ファイル1枚を分類するパイプライン
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    filename: PathBuf,
}

impl PredictionPipeline {
    pub fn new<P: Into<PathBuf>>(filename: P) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// 既定の場所からモデルを読み込んで予測
    pub fn predict(&self) -> Result<Vec<Prediction>> {
        self.predict_from(DEFAULT_MODEL_PATH)
    }

    /// 指定したモデルアーカイブで予測
    ///
    /// モデルは呼び出しごとに読み込まれ、終了時に解放されます。
    pub fn predict_from<P: AsRef<Path>>(&self, model_path: P) -> Result<Vec<Prediction>> {
        let engine = InferenceEngine::<DefaultBackend>::load(model_path)?;
        self.predict_with(&engine)
    }

    /// 任意の分類器で予測
    ///
    /// 戻り値は常に要素1つのリストです。
    pub fn predict_with<C: ImageClassifier + ?Sized>(&self, classifier: &C) -> Result<Vec<Prediction>> {
        let class_idx = classifier.predict_class_index(&self.filename)?;
        let label = class_index_to_label(class_idx);

        Ok(vec![Prediction {
            image: label.to_string(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::CLASS_NAMES;

    /// 常に同じインデックスを返すモック
    struct FixedClassifier(usize);

    impl ImageClassifier for FixedClassifier {
        fn predict_class_index(&self, _image_path: &Path) -> Result<usize> {
            Ok(self.0)
        }
    }

    struct FailingClassifier;

    impl ImageClassifier for FailingClassifier {
        fn predict_class_index(&self, image_path: &Path) -> Result<usize> {
            anyhow::bail!("cannot decode {}", image_path.display())
        }
    }

    #[test]
    fn test_predict_with_known_indices() {
        let pipeline = PredictionPipeline::new("scan.jpg");
        assert_eq!(pipeline.filename(), Path::new("scan.jpg"));
        for (idx, name) in CLASS_NAMES.iter().enumerate() {
            let result = pipeline.predict_with(&FixedClassifier(idx)).unwrap();
            assert_eq!(result, vec![Prediction { image: name.to_string() }]);
        }
    }

    #[test]
    fn test_predict_with_out_of_range_index() {
        let pipeline = PredictionPipeline::new("scan.jpg");
        let result = pipeline.predict_with(&FixedClassifier(7)).unwrap();
        assert_eq!(result, vec![Prediction { image: "Unknown".to_string() }]);
    }

    #[test]
    fn test_predict_with_propagates_error() {
        let pipeline = PredictionPipeline::new("scan.jpg");
        let err = pipeline.predict_with(&FailingClassifier).unwrap_err();
        assert!(err.to_string().contains("scan.jpg"));
    }

    #[test]
    fn test_prediction_json_shape() {
        let json = serde_json::to_string(&vec![Prediction { image: "Stone".to_string() }]).unwrap();
        assert_eq!(json, r#"[{"image":"Stone"}]"#);
    }
}
