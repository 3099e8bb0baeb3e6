//! 원자재 선물 다음 날 종가 예측 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (SMA, EMA, MACD 히스토그램, RSI, 표준편차)
//! - Feature 프레임 생성과 참조 지표(달러 인덱스) 정렬
//! - Min-max 스케일링, 시퀀스 윈도우, 시간순 분할
//! - LSTM 회귀 모델 (burn) 학습과 조기 종료
//! - 테스트 구간 평가 (RMSE, 방향 정확도)와 차트 데이터
//!
//! # Re-exports
//!
//! - [`indicators`]: 기술적 지표 계산
//! - [`service`]: 전체 파이프라인 진입점 ([`ForecastService`])

pub mod chart;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod indicators;
pub mod model;
pub mod service;
pub mod training;

pub use chart::{next_trading_day, ChartPoint, ForecastChart, CHART_POINTS};
pub use dataset::{
    build_windows, latest_window, FeatureVector, MinMaxScaler, Partition, PreparedData,
    SequenceWindow,
};
pub use error::{ForecastError, MlError, MlResult};
pub use evaluation::{directional_accuracy, rmse, EvaluationReport, Evaluator};
pub use features::{forward_fill_align, FeatureConfig, FeatureEngine};
pub use indicators::{
    EmaParams, IndicatorEngine, IndicatorError, IndicatorResult, MacdParams, RsiParams, SmaParams,
    StdDevParams,
};
pub use model::{InferenceBackend, LstmRegressor, LstmRegressorConfig, TrainingBackend};
pub use service::ForecastService;
pub use training::{
    learning_rate_at, EarlyStopping, EpochOutcome, EpochRecord, TrainedModel, Trainer,
    TrainingReport,
};
