//! 腎臓CT画像の4クラス分類と、MLプロジェクト雛形の生成

pub mod logging;
pub mod ml;
pub mod model;
pub mod scaffold;

pub use ml::{ImageClassifier, InferenceEngine, Prediction, PredictionPipeline};
pub use scaffold::{scaffold_files, ExistingFilePolicy, Scaffold, ScaffoldReport};
