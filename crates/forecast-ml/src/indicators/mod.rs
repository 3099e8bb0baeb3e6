//! 기술적 지표 모듈.
//!
//! 종가 시계열에서 feature 컬럼을 만드는 지표들을 제공합니다.
//! 모든 계산은 입력과 같은 길이의 `Vec<Option<f64>>`를 반환하며,
//! 계산에 필요한 이력이 부족한 앞부분은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표
//! - **SMA**: 단순 이동평균
//! - **EMA**: 지수 이동평균 (첫 값으로 시작, 편향 보정 없음)
//! - **MACD 히스토그램**: (EMA12 − EMA26) − EMA9(EMA12 − EMA26)
//!
//! ## 모멘텀 지표
//! - **RSI**: 상대강도지수 (단순 이동평균 방식)
//!
//! ## 변동성 지표
//! - **Rolling Std**: 표본 표준편차 (n−1)
//!
//! # 사용 예시
//!
//! ```ignore
//! use forecast_ml::indicators::{IndicatorEngine, RsiParams, SmaParams};
//!
//! let engine = IndicatorEngine::new();
//! let ma = engine.sma(&closes, SmaParams { period: 7 })?;
//! let rsi = engine.rsi(&closes, RsiParams::default())?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use thiserror::Error;

pub use momentum::{MomentumCalculator, RsiParams, RSI_NEUTRAL};
pub use trend::{EmaParams, MacdParams, SmaParams, TrendIndicators};
pub use volatility::{StdDevParams, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

pub(crate) fn require_period(period: usize, min: usize, name: &str) -> IndicatorResult<()> {
    if period < min {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} 기간은 {} 이상이어야 합니다: {}",
            name, min, period
        )));
    }
    Ok(())
}

/// 통합 지표 엔진.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 단순 이동평균.
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.sma(prices, params)
    }

    /// 지수 이동평균.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.ema(prices, params)
    }

    /// MACD 히스토그램.
    pub fn macd_histogram(
        &self,
        prices: &[f64],
        params: MacdParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.trend.macd_histogram(prices, params)
    }

    /// RSI.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.rsi(prices, params)
    }

    /// 이동 표본 표준편차.
    pub fn rolling_std(
        &self,
        prices: &[f64],
        params: StdDevParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.rolling_std(prices, params)
    }
}
