//! ML 및 예측 파이프라인 에러 타입.

use thiserror::Error;

use crate::indicators::IndicatorError;
use forecast_core::CoreError;
use forecast_data::DataError;

/// ML 작업에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// 학습/평가를 위한 데이터 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 학습 실패
    #[error("Training error: {0}")]
    Training(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 텐서 변환 에러
    #[error("Tensor error: {0}")]
    Tensor(String),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 이 에러가 복구 가능한지 확인 (다른 데이터로 재시도 가능).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MlError::InsufficientData { .. } | MlError::InvalidInput(_)
        )
    }
}

impl From<IndicatorError> for MlError {
    fn from(err: IndicatorError) -> Self {
        MlError::InvalidInput(err.to_string())
    }
}

/// 예측 진입점(`ForecastService::run_forecast`)의 에러.
///
/// 메시지에 원인이 포함됩니다.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// 데이터 수집 실패
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// 윈도우/분할에 필요한 행 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 학습 실패
    #[error("Training error: {0}")]
    Training(String),

    /// 평가/예측 실패
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// 학습 작업 join 실패
    #[error("Training task failed: {0}")]
    Join(String),
}

impl ForecastError {
    /// 학습 단계 에러로 변환.
    pub fn training(err: MlError) -> Self {
        match err {
            MlError::InsufficientData { required, actual } => {
                ForecastError::InsufficientData { required, actual }
            }
            other => ForecastError::Training(other.to_string()),
        }
    }

    /// 평가 단계 에러로 변환.
    pub fn evaluation(err: MlError) -> Self {
        match err {
            MlError::InsufficientData { required, actual } => {
                ForecastError::InsufficientData { required, actual }
            }
            other => ForecastError::Evaluation(other.to_string()),
        }
    }

    /// 데이터가 없거나 너무 짧아 예측할 수 없는 경우인지 확인.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, ForecastError::Data(DataError::DataUnavailable { .. }))
    }
}

impl From<tokio::task::JoinError> for ForecastError {
    fn from(err: tokio::task::JoinError) -> Self {
        ForecastError::Join(err.to_string())
    }
}
