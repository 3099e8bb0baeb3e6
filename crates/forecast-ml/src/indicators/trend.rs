//! 추세 지표.
//!
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD 히스토그램

use serde::{Deserialize, Serialize};

use super::{require_period, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간 (기본: 7).
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 7 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaParams {
    /// span (alpha = 2 / (span + 1)).
    pub span: usize,
}

impl EmaParams {
    /// 평활 계수.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA span (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA span (기본: 26).
    pub slow_period: usize,
    /// 시그널 EMA span (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균. 앞의 `period − 1`개는 `None`.
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        require_period(params.period, 1, "SMA")?;
        let period = params.period;

        Ok((0..prices.len())
            .map(|i| {
                if i + 1 < period {
                    None
                } else {
                    let window = &prices[i + 1 - period..=i];
                    Some(window.iter().sum::<f64>() / period as f64)
                }
            })
            .collect())
    }

    /// 지수 이동평균.
    ///
    /// 첫 값을 시작값으로 쓰고 편향 보정은 하지 않으므로 모든 위치에서 정의됩니다.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        require_period(params.span, 1, "EMA")?;
        let alpha = params.alpha();

        let mut result = Vec::with_capacity(prices.len());
        let mut prev: Option<f64> = None;
        for &price in prices {
            let value = match prev {
                None => price,
                Some(p) => alpha * price + (1.0 - alpha) * p,
            };
            result.push(value);
            prev = Some(value);
        }
        Ok(result)
    }

    /// MACD 히스토그램: MACD − 시그널.
    ///
    /// EMA가 0번 위치부터 정의되므로 히스토그램도 모든 위치에서 `Some`입니다.
    pub fn macd_histogram(
        &self,
        prices: &[f64],
        params: MacdParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        let fast = self.ema(prices, EmaParams { span: params.fast_period })?;
        let slow = self.ema(prices, EmaParams { span: params.slow_period })?;

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = self.ema(&macd, EmaParams { span: params.signal_period })?;

        Ok(macd
            .iter()
            .zip(&signal)
            .map(|(m, s)| Some(m - s))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let calc = TrendIndicators::new();
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = calc.sma(&prices, SmaParams { period: 3 }).unwrap();

        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_eq!(sma[2], Some(2.0));
        assert_eq!(sma[4], Some(4.0));
    }

    #[test]
    fn test_sma_shorter_than_period() {
        let calc = TrendIndicators::new();
        let sma = calc.sma(&[1.0, 2.0], SmaParams::default()).unwrap();
        assert!(sma.iter().all(Option::is_none));
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let calc = TrendIndicators::new();
        // span 3 → alpha 0.5
        let ema = calc.ema(&[10.0, 20.0, 30.0], EmaParams { span: 3 }).unwrap();
        assert_eq!(ema, vec![10.0, 15.0, 22.5]);
    }

    #[test]
    fn test_macd_histogram_flat_series_is_zero() {
        let calc = TrendIndicators::new();
        let prices = vec![42.0; 60];
        let hist = calc.macd_histogram(&prices, MacdParams::default()).unwrap();

        assert_eq!(hist.len(), 60);
        assert!(hist.iter().all(|h| h.map(|v| v.abs() < 1e-9).unwrap_or(false)));
    }

    #[test]
    fn test_macd_histogram_rising_series_positive() {
        let calc = TrendIndicators::new();
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let hist = calc.macd_histogram(&prices, MacdParams::default()).unwrap();

        // 상승 추세 초반에는 MACD가 시그널보다 빠르게 증가
        assert!(hist[10].unwrap() > 0.0);
        assert_eq!(hist[0], Some(0.0));
    }

    #[test]
    fn test_zero_period_rejected() {
        let calc = TrendIndicators::new();
        assert!(calc.sma(&[1.0], SmaParams { period: 0 }).is_err());
        assert!(calc.ema(&[1.0], EmaParams { span: 0 }).is_err());
    }
}
