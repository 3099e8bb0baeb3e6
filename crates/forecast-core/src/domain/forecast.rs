//! 예측 결과 레코드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 학습 종료 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// patience 소진 (연속 미개선 epoch 수 도달)
    PatienceExhausted,
    /// 최대 epoch 도달
    MaxEpochsReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PatienceExhausted => write!(f, "early_stop"),
            StopReason::MaxEpochsReached => write!(f, "max_epochs"),
        }
    }
}

/// 학습 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// 실행된 epoch 수
    pub epochs_run: usize,
    /// 최적 스냅샷의 epoch (0부터)
    pub best_epoch: usize,
    /// 최적 검증 MSE (스케일 공간)
    pub best_val_loss: f64,
    /// 종료 사유
    pub stop_reason: StopReason,
}

/// 한 종목의 다음 날 예측 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// 종목 티커
    pub ticker: String,
    /// 원자재 이름 (카탈로그에 있는 경우)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commodity_name: Option<String>,
    /// 현재가 (마지막 종가)
    pub current_price: f64,
    /// 다음 날 예측 가격
    pub next_day_forecast: f64,
    /// 테스트 구간 RMSE (가격 단위)
    pub rmse: f64,
    /// 테스트 구간 방향 정확도 (0.0 ~ 1.0)
    pub directional_accuracy: f64,
    /// 학습 요약
    pub training: TrainingSummary,
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 차트 데이터 파일 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<PathBuf>,
}

impl ForecastResult {
    /// 현재가 대비 예측 변동률 (%).
    pub fn expected_change_pct(&self) -> f64 {
        if self.current_price == 0.0 {
            return 0.0;
        }
        (self.next_day_forecast - self.current_price) / self.current_price * 100.0
    }
}
