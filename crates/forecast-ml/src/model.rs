//! LSTM 회귀 모델.
//!
//! ```text
//! [batch, W, 7] ─▶ LSTM(7→128) ─▶ Dropout ─▶ LSTM(128→128) ─▶ 마지막 시점 ─▶ Linear(128→1)
//! ```
//!
//! 학습은 `Autodiff<NdArray>`에서, 평가와 예측은 dropout이 꺼진
//! 내부 backend(`NdArray`)에서 수행합니다.

use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig};
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use serde::{Deserialize, Serialize};

use crate::dataset::{FeatureVector, SequenceWindow};
use crate::error::{MlError, MlResult};
use forecast_core::{ModelConfig, FEATURE_COUNT};

/// 추론 backend.
pub type InferenceBackend = NdArray<f32>;

/// 학습 backend.
pub type TrainingBackend = Autodiff<InferenceBackend>;

/// LSTM 회귀 모델 설정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmRegressorConfig {
    /// 입력 feature 수
    pub input_size: usize,
    /// 은닉 차원
    pub hidden_size: usize,
    /// 쌓을 LSTM 레이어 수
    pub num_layers: usize,
    /// 레이어 사이 dropout 비율
    pub dropout: f64,
}

impl Default for LstmRegressorConfig {
    fn default() -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size: 128,
            num_layers: 2,
            dropout: 0.2,
        }
    }
}

impl LstmRegressorConfig {
    /// 애플리케이션 설정의 model 섹션에서 생성.
    pub fn from_model_config(config: &ModelConfig) -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size: config.hidden_size,
            num_layers: config.num_layers,
            dropout: config.dropout,
        }
    }

    /// 은닉 차원 설정.
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// 레이어 수 설정.
    pub fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// 설정 검증.
    pub fn validate(&self) -> MlResult<()> {
        if self.input_size == 0 || self.hidden_size == 0 || self.num_layers == 0 {
            return Err(MlError::InvalidInput(format!(
                "잘못된 모델 크기: input {}, hidden {}, layers {}",
                self.input_size, self.hidden_size, self.num_layers
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(MlError::InvalidInput(format!(
                "dropout은 [0, 1) 범위여야 합니다: {}",
                self.dropout
            )));
        }
        Ok(())
    }

    /// 새 가중치로 모델을 만듭니다.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmRegressor<B> {
        let layers = (0..self.num_layers)
            .map(|i| {
                let d_input = if i == 0 {
                    self.input_size
                } else {
                    self.hidden_size
                };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();

        LstmRegressor {
            layers,
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}

/// 다층 LSTM + 선형 출력 회귀 모델.
#[derive(Module, Debug)]
pub struct LstmRegressor<B: Backend> {
    layers: Vec<Lstm<B>>,
    dropout: Dropout,
    output: Linear<B>,
}

impl<B: Backend> LstmRegressor<B> {
    /// `[batch, seq, features]` → `[batch, 1]`.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let last_layer = self.layers.len().saturating_sub(1);
        let mut x = input;

        for (i, layer) in self.layers.iter().enumerate() {
            let (output, _state) = layer.forward(x, None);
            // dropout은 레이어 사이에만 적용
            x = if i < last_layer {
                self.dropout.forward(output)
            } else {
                output
            };
        }

        let [batch, seq, hidden] = x.dims();
        let last_step = x
            .slice([0..batch, seq - 1..seq, 0..hidden])
            .reshape([batch, hidden]);
        self.output.forward(last_step)
    }

    /// 레이어 수.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

/// 입력 시퀀스들을 `[n, W, F]` 텐서로 변환.
pub fn sequences_to_tensor<B: Backend>(
    sequences: &[&[FeatureVector]],
    device: &B::Device,
) -> MlResult<Tensor<B, 3>> {
    let n = sequences.len();
    let seq_len = sequences.first().map(|s| s.len()).unwrap_or(0);
    if n == 0 || seq_len == 0 {
        return Err(MlError::InvalidInput("빈 배치".into()));
    }
    if sequences.iter().any(|s| s.len() != seq_len) {
        return Err(MlError::InvalidInput("배치 내 시퀀스 길이가 다릅니다".into()));
    }

    let values: Vec<f32> = sequences
        .iter()
        .flat_map(|seq| seq.iter())
        .flat_map(|row| row.iter().map(|&v| v as f32))
        .collect();

    Ok(Tensor::from_data(
        TensorData::new(values, [n, seq_len, FEATURE_COUNT]),
        device,
    ))
}

/// 윈도우 묶음을 입력 텐서와 `[n, 1]` 레이블 텐서로 변환.
pub fn windows_to_tensors<B: Backend>(
    windows: &[&SequenceWindow],
    device: &B::Device,
) -> MlResult<(Tensor<B, 3>, Tensor<B, 2>)> {
    let sequences: Vec<&[FeatureVector]> = windows.iter().map(|w| w.inputs.as_slice()).collect();
    let inputs = sequences_to_tensor(&sequences, device)?;

    let labels: Vec<f32> = windows.iter().map(|w| w.label as f32).collect();
    let targets = Tensor::from_data(TensorData::new(labels, [windows.len(), 1]), device);

    Ok((inputs, targets))
}

/// `[n, 1]` 출력 텐서를 값 목록으로 변환.
pub fn tensor_to_vec<B: Backend>(output: Tensor<B, 2>) -> MlResult<Vec<f64>> {
    output
        .into_data()
        .to_vec::<f32>()
        .map(|values| values.into_iter().map(f64::from).collect())
        .map_err(|e| MlError::Tensor(format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn small_config() -> LstmRegressorConfig {
        LstmRegressorConfig::default()
            .with_hidden_size(8)
            .with_num_layers(2)
    }

    fn window(seq_len: usize, label: f64) -> SequenceWindow {
        SequenceWindow {
            inputs: (0..seq_len).map(|i| [i as f64 / 10.0; FEATURE_COUNT]).collect(),
            label,
            target_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = small_config().init::<InferenceBackend>(&device);
        assert_eq!(model.num_layers(), 2);

        let windows = [window(5, 0.1), window(5, 0.2), window(5, 0.3)];
        let refs: Vec<&SequenceWindow> = windows.iter().collect();
        let (inputs, targets) = windows_to_tensors::<InferenceBackend>(&refs, &device).unwrap();

        assert_eq!(inputs.dims(), [3, 5, FEATURE_COUNT]);
        assert_eq!(targets.dims(), [3, 1]);
        assert_eq!(model.forward(inputs).dims(), [3, 1]);
    }

    #[test]
    fn test_tensor_roundtrip_values() {
        let device = Default::default();
        let windows = [window(2, 0.25), window(2, 0.75)];
        let refs: Vec<&SequenceWindow> = windows.iter().collect();
        let (_, targets) = windows_to_tensors::<InferenceBackend>(&refs, &device).unwrap();

        assert_eq!(tensor_to_vec(targets).unwrap(), vec![0.25, 0.75]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let device = Default::default();
        assert!(sequences_to_tensor::<InferenceBackend>(&[], &device).is_err());
    }

    #[test]
    fn test_config_validation() {
        assert!(LstmRegressorConfig::default().validate().is_ok());
        assert!(small_config().with_num_layers(0).validate().is_err());
        let mut config = small_config();
        config.dropout = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_model_config() {
        let config = LstmRegressorConfig::from_model_config(&ModelConfig::default());
        assert_eq!(config, LstmRegressorConfig::default());
    }
}
