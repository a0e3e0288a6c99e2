//! 機械学習モデルの共通定義
//!
//! 腎臓CT画像分類用のCNNモデルと、クラスラベル表・入力画像の前処理を提供します。

use anyhow::{Context, Result};
use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, Relu,
    },
    tensor::{backend::Backend, Int, Tensor, TensorData},
};
use image::imageops::FilterType;
use std::path::Path;

/// クラス数
pub const NUM_CLASSES: usize = 4;

/// 画像サイズ（モデル入力は 224x224 のRGB）
pub const IMAGE_SIZE: usize = 224;

/// クラス名の定義（インデックス順）
pub const CLASS_NAMES: [&str; NUM_CLASSES] = ["Cyst", "Normal", "Stone", "Tumor"];

/// 範囲外のクラスインデックスに対するラベル
pub const UNKNOWN_LABEL: &str = "Unknown";

/// クラスインデックスからラベルを取得
///
/// 表にないインデックスは `"Unknown"` になります。
pub fn class_index_to_label(index: usize) -> &'static str {
    CLASS_NAMES.get(index).copied().unwrap_or(UNKNOWN_LABEL)
}

/// モデル設定
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// 分類クラス数
    #[config(default = 4)]
    pub num_classes: usize,
    /// 全結合層の隠れ次元
    #[config(default = 64)]
    pub hidden_size: usize,
}

impl ModelConfig {
    /// モデルを初期化
    pub fn init<B: Backend>(&self, device: &B::Device) -> KidneyClassifier<B> {
        KidneyClassifier {
            // Conv1: 3x3 (no padding, stride 1)
            conv1: Conv2dConfig::new([3, 32], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),

            conv2: Conv2dConfig::new([32, 64], [3, 3])
                .with_stride([1, 1])
                .init(device),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),

            conv3: Conv2dConfig::new([64, 128], [3, 3])
                .with_stride([1, 1])
                .init(device),

            // 入力サイズに依存しないよう空間方向を 1x1 に平均化
            global_pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),

            fc1: LinearConfig::new(128, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.num_classes).init(device),

            activation: Relu::new(),
        }
    }
}

/// 腎臓CT画像分類用CNNモデル
///
/// # アーキテクチャ
/// - {Conv 3x3 + ReLU + MaxPool 2x2} x 2層
/// - Conv 3x3 + ReLU
/// - AdaptiveAvgPool (1x1) + Flatten
/// - FC: 128 -> hidden + ReLU
/// - FC: hidden -> num_classes
#[derive(Module, Debug)]
pub struct KidneyClassifier<B: Backend> {
    conv1: Conv2d<B>, // 3 -> 32
    pool1: MaxPool2d,
    conv2: Conv2d<B>, // 32 -> 64
    pool2: MaxPool2d,
    conv3: Conv2d<B>, // 64 -> 128
    global_pool: AdaptiveAvgPool2d,

    fc1: Linear<B>,
    fc2: Linear<B>,

    activation: Relu,
}

impl<B: Backend> KidneyClassifier<B> {
    /// 順伝播
    ///
    /// # 引数
    /// - `images`: バッチ画像 [batch_size, 3, size, size]
    ///
    /// # 戻り値
    /// - クラスごとのスコア [batch_size, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        let x = self.conv1.forward(images);
        let x = self.activation.forward(x);
        let x = self.pool1.forward(x);

        let x = self.conv2.forward(x);
        let x = self.activation.forward(x);
        let x = self.pool2.forward(x);

        let x = self.conv3.forward(x);
        let x = self.activation.forward(x);

        let x = self.global_pool.forward(x);
        let [_, c, h, w] = x.dims();
        let x = x.reshape([batch_size, c * h * w]);

        let x = self.fc1.forward(x);
        let x = self.activation.forward(x);

        self.fc2.forward(x)
    }

    /// 予測クラスIDを返す [batch_size, 1]
    pub fn predict(&self, images: Tensor<B, 4>) -> Tensor<B, 2, Int> {
        self.forward(images).argmax(1)
    }
}

/// 画像を読み込んでモデル入力用に変換
///
/// RGBへ変換後、最近傍補間で `size` x `size` にリサイズします。
/// 画素値は 0〜255 のまま（正規化なし）で、(C, H, W) の順で平坦化されます。
pub fn load_image_pixels(path: &Path, size: usize) -> Result<Vec<f32>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode image: {}", path.display()))?
        .to_rgb8();

    let side = size as u32;
    let img = image::imageops::resize(&img, side, side, FilterType::Nearest);

    let mut data = Vec::with_capacity(3 * size * size);
    for channel in 0..3 {
        for y in 0..side {
            for x in 0..side {
                data.push(img.get_pixel(x, y)[channel] as f32);
            }
        }
    }

    Ok(data)
}

/// 画像を読み込んでバッチサイズ1のテンソル [1, 3, size, size] を作成
pub fn load_image_tensor<B: Backend>(
    path: &Path,
    size: usize,
    device: &B::Device,
) -> Result<Tensor<B, 4>> {
    let pixels = load_image_pixels(path, size)?;
    let data = TensorData::new(pixels, [1, 3, size, size]).convert::<B::FloatElem>();
    Ok(Tensor::from_data(data, device))
}
