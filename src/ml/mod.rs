pub mod ml_model;
pub mod inference;
pub mod export;
pub mod pipeline;

pub use ml_model::{
    class_index_to_label, load_image_pixels, load_image_tensor, KidneyClassifier, ModelConfig,
    CLASS_NAMES, IMAGE_SIZE, NUM_CLASSES, UNKNOWN_LABEL,
};
pub use inference::{ImageClassifier, InferenceEngine};
pub use export::export_model;
pub use pipeline::{DefaultBackend, Prediction, PredictionPipeline, DEFAULT_MODEL_PATH};
