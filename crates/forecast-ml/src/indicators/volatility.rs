//! 변동성 지표.

use serde::{Deserialize, Serialize};

use super::{require_period, IndicatorResult};

/// 이동 표준편차 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StdDevParams {
    /// 기간 (기본: 14).
    pub period: usize,
}

impl Default for StdDevParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 이동 표본 표준편차 (n−1 분모). 앞의 `period − 1`개는 `None`.
    pub fn rolling_std(
        &self,
        prices: &[f64],
        params: StdDevParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        // 표본 표준편차는 최소 2개가 필요
        require_period(params.period, 2, "표준편차")?;
        let period = params.period;

        Ok((0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &prices[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>()
                    / (period - 1) as f64;
                Some(variance.sqrt())
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_std_sample() {
        let calc = VolatilityIndicators::new();
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = calc
            .rolling_std(&prices, StdDevParams { period: 8 })
            .unwrap();

        assert!(std[..7].iter().all(Option::is_none));
        // 모집단 표준편차 2.0, 표본 표준편차 sqrt(32/7)
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((std[7].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_constant_is_zero() {
        let calc = VolatilityIndicators::new();
        let std = calc
            .rolling_std(&[3.0; 20], StdDevParams::default())
            .unwrap();
        assert_eq!(std[13], Some(0.0));
        assert_eq!(std[12], None);
    }

    #[test]
    fn test_period_one_rejected() {
        let calc = VolatilityIndicators::new();
        assert!(calc
            .rolling_std(&[1.0, 2.0], StdDevParams { period: 1 })
            .is_err());
    }
}
