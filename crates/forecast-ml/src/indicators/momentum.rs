//! 모멘텀 지표.
//!
//! - RSI (Relative Strength Index)

use serde::{Deserialize, Serialize};

use super::{require_period, IndicatorResult};

/// 상승/하락이 모두 없을 때 이전 값이 없으면 쓰는 중립값.
pub const RSI_NEUTRAL: f64 = 50.0;

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI 계산.
    ///
    /// RSI = 100 − 100 / (1 + RS), RS = 평균 상승폭 / 평균 하락폭.
    /// 평균은 최근 `period`개 변화량의 단순 평균이며 첫 변화량은 0입니다.
    ///
    /// - 하락폭 평균이 0이고 상승폭 평균이 양수면 100
    /// - 둘 다 0이면 직전 RSI를 유지하고, 직전 값이 없으면 50
    /// - 앞의 `period − 1`개는 `None`
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        require_period(params.period, 1, "RSI")?;
        let period = params.period;

        // 가격 변화 계산
        let mut deltas = Vec::with_capacity(prices.len());
        if !prices.is_empty() {
            deltas.push(0.0); // 첫 번째는 변화 없음
        }
        deltas.extend(prices.windows(2).map(|w| w[1] - w[0]));

        let gains: Vec<f64> = deltas.iter().map(|&d| d.max(0.0)).collect();
        let losses: Vec<f64> = deltas.iter().map(|&d| (-d).max(0.0)).collect();

        let mut result = Vec::with_capacity(prices.len());
        let mut last: Option<f64> = None;

        for i in 0..prices.len() {
            if i + 1 < period {
                result.push(None);
                continue;
            }

            let start = i + 1 - period;
            let gain = gains[start..=i].iter().sum::<f64>() / period as f64;
            let loss = losses[start..=i].iter().sum::<f64>() / period as f64;

            let value = if loss == 0.0 {
                if gain > 0.0 {
                    100.0
                } else {
                    last.unwrap_or(RSI_NEUTRAL)
                }
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            };

            last = Some(value);
            result.push(Some(value));
        }

        Ok(result)
    }
}
