//! 테스트 구간 평가와 다음 날 예측.

use burn::tensor::backend::Backend;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dataset::{FeatureVector, MinMaxScaler, SequenceWindow};
use crate::error::{MlError, MlResult};
use crate::model::{sequences_to_tensor, tensor_to_vec, LstmRegressor};

const PREDICT_BATCH_SIZE: usize = 256;

/// 평균 제곱근 오차. 빈 입력이면 0.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    (sum / n as f64).sqrt()
}

/// 연속한 두 점 사이의 방향 (−1, 0, 1).
fn direction(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// 방향 정확도.
///
/// 연속한 두 점의 변화 방향(상승/보합/하락)이 같은 쌍의 비율입니다.
/// 분모는 쌍의 개수이며, 점이 2개 미만이면 0.
pub fn directional_accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n < 2 {
        return 0.0;
    }

    let pairs = n - 1;
    let correct = (0..pairs)
        .filter(|&i| {
            direction(actual[i + 1] - actual[i]) == direction(predicted[i + 1] - predicted[i])
        })
        .count();

    correct as f64 / pairs as f64
}

/// 테스트 구간 평가 결과 (가격 단위).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// 레이블 날짜
    pub dates: Vec<NaiveDate>,
    /// 실제 종가
    pub actual: Vec<f64>,
    /// 예측 종가
    pub predicted: Vec<f64>,
    /// RMSE
    pub rmse: f64,
    /// 방향 정확도
    pub directional_accuracy: f64,
}

/// 학습된 모델로 예측과 평가를 수행합니다.
pub struct Evaluator<'a, B: Backend> {
    model: &'a LstmRegressor<B>,
    scaler: &'a MinMaxScaler,
    device: B::Device,
}

impl<'a, B: Backend> Evaluator<'a, B> {
    /// 새 평가기 생성.
    pub fn new(model: &'a LstmRegressor<B>, scaler: &'a MinMaxScaler, device: B::Device) -> Self {
        Self {
            model,
            scaler,
            device,
        }
    }

    /// 시퀀스들의 스케일 공간 예측값.
    pub fn predict_scaled(&self, sequences: &[&[FeatureVector]]) -> MlResult<Vec<f64>> {
        let mut predictions = Vec::with_capacity(sequences.len());
        for chunk in sequences.chunks(PREDICT_BATCH_SIZE) {
            let inputs = sequences_to_tensor::<B>(chunk, &self.device)?;
            predictions.extend(tensor_to_vec(self.model.forward(inputs))?);
        }
        Ok(predictions)
    }

    /// 테스트 구간을 가격 단위로 평가합니다.
    pub fn evaluate(&self, test: &[SequenceWindow]) -> MlResult<EvaluationReport> {
        if test.is_empty() {
            return Err(MlError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let sequences: Vec<&[FeatureVector]> = test.iter().map(|w| w.inputs.as_slice()).collect();
        let predicted: Vec<f64> = self
            .predict_scaled(&sequences)?
            .into_iter()
            .map(|v| self.scaler.inverse_target(v))
            .collect();
        let actual: Vec<f64> = test
            .iter()
            .map(|w| self.scaler.inverse_target(w.label))
            .collect();

        if predicted.iter().any(|v| !v.is_finite()) {
            return Err(MlError::InvalidInput("예측값에 유한하지 않은 값이 있습니다".into()));
        }

        Ok(EvaluationReport {
            dates: test.iter().map(|w| w.target_date).collect(),
            rmse: rmse(&actual, &predicted),
            directional_accuracy: directional_accuracy(&actual, &predicted),
            actual,
            predicted,
        })
    }

    /// 마지막 윈도우로 다음 날 종가를 예측합니다.
    pub fn forecast_next(&self, latest: &[FeatureVector]) -> MlResult<f64> {
        let scaled = self
            .predict_scaled(&[latest])?
            .first()
            .copied()
            .ok_or_else(|| MlError::Tensor("빈 예측 결과".into()))?;

        let price = self.scaler.inverse_target(scaled);
        if !price.is_finite() {
            return Err(MlError::InvalidInput(format!("유한하지 않은 예측값: {}", price)));
        }
        Ok(price)
    }
}
