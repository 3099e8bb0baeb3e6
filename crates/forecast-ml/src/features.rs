//! Feature 프레임 생성.
//!
//! 일봉 시계열에서 고정 컬럼 순서
//! `[close, close_ma, rsi, macd_hist, volatility, volume, dollar]`의
//! 프레임을 만듭니다. 어느 컬럼이든 값이 없는 행은 제외합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MlError, MlResult};
use crate::indicators::{IndicatorEngine, MacdParams, RsiParams, SmaParams, StdDevParams};
use forecast_core::{FeatureFrame, FeatureRow, RawSeries, ReferenceSeries};

/// Feature 생성 설정.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// 종가 이동평균 기간
    pub ma_period: usize,
    /// RSI 기간
    pub rsi_period: usize,
    /// MACD 파라미터
    pub macd: MacdParams,
    /// 변동성(표준편차) 기간
    pub volatility_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ma_period: 7,
            rsi_period: 14,
            macd: MacdParams::default(),
            volatility_period: 14,
        }
    }
}

impl FeatureConfig {
    /// 모든 컬럼이 정의되기까지 제외되는 앞부분 행 수.
    pub fn warmup_rows(&self) -> usize {
        [self.ma_period, self.rsi_period, self.volatility_period]
            .into_iter()
            .max()
            .unwrap_or(1)
            .saturating_sub(1)
    }
}

/// 각 대상 날짜에 대해 그 날짜 이전(포함)의 마지막 참조 값을 찾습니다.
///
/// 참조 시계열은 날짜순이어야 합니다. 첫 참조 날짜보다 이른 날짜는 `None`.
pub fn forward_fill_align(target_dates: &[NaiveDate], reference: &ReferenceSeries) -> Vec<Option<f64>> {
    let points = &reference.points;
    let mut cursor = 0;
    let mut last: Option<f64> = None;

    target_dates
        .iter()
        .map(|date| {
            while cursor < points.len() && points[cursor].0 <= *date {
                last = Some(points[cursor].1);
                cursor += 1;
            }
            last
        })
        .collect()
}

/// Feature 프레임 생성기.
#[derive(Debug, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
    indicators: IndicatorEngine,
}

impl FeatureEngine {
    /// 기본 설정으로 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정 지정.
    pub fn with_config(config: FeatureConfig) -> Self {
        Self {
            config,
            indicators: IndicatorEngine::new(),
        }
    }

    /// 설정.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// 시계열과 참조 지표로 feature 프레임을 만듭니다.
    ///
    /// 참조 지표가 없거나 비어 있으면 모든 행의 `dollar`에 대상 종가 평균을 씁니다.
    pub fn build(
        &self,
        series: &RawSeries,
        reference: Option<&ReferenceSeries>,
    ) -> MlResult<FeatureFrame> {
        if series.is_empty() {
            return Err(MlError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let closes = series.closes();
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(MlError::InvalidInput(format!(
                "{}: 종가에 유한하지 않은 값이 있습니다",
                series.ticker()
            )));
        }

        let cfg = &self.config;
        let close_ma = self.indicators.sma(&closes, SmaParams { period: cfg.ma_period })?;
        let rsi = self.indicators.rsi(&closes, RsiParams { period: cfg.rsi_period })?;
        let macd_hist = self.indicators.macd_histogram(&closes, cfg.macd)?;
        let volatility = self.indicators.rolling_std(
            &closes,
            StdDevParams {
                period: cfg.volatility_period,
            },
        )?;

        let dates = series.dates();
        let dollar: Vec<Option<f64>> = match reference.filter(|r| !r.is_empty()) {
            Some(reference) => forward_fill_align(&dates, reference),
            None => {
                let fallback = series.mean_close();
                debug!(ticker = %series.ticker(), fallback = ?fallback, "참조 지표 없음, 종가 평균 사용");
                vec![fallback; dates.len()]
            }
        };

        let rows: Vec<FeatureRow> = series
            .bars()
            .iter()
            .enumerate()
            .filter_map(|(i, bar)| {
                Some(FeatureRow {
                    date: bar.date,
                    close: bar.close,
                    close_ma: close_ma[i]?,
                    rsi: rsi[i]?,
                    macd_hist: macd_hist[i]?,
                    volatility: volatility[i]?,
                    volume: bar.volume,
                    dollar: dollar[i]?,
                })
            })
            .collect();

        debug!(
            ticker = %series.ticker(),
            raw_rows = series.len(),
            feature_rows = rows.len(),
            "Feature 프레임 생성"
        );

        Ok(FeatureFrame::new(series.ticker(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::RawBar;

    fn date(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn series(closes: &[f64]) -> RawSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| RawBar::new(date(i as i64), c, c, c, c, 500.0 + i as f64))
            .collect();
        RawSeries::new("KC=F", bars)
    }

    #[test]
    fn test_forward_fill_align() {
        let reference = ReferenceSeries {
            symbol: "DX-Y.NYB".into(),
            points: vec![(date(1), 100.0), (date(3), 101.0)],
        };
        let dates: Vec<NaiveDate> = (0..5).map(date).collect();

        let aligned = forward_fill_align(&dates, &reference);
        assert_eq!(
            aligned,
            vec![None, Some(100.0), Some(100.0), Some(101.0), Some(101.0)]
        );
    }

    #[test]
    fn test_build_drops_warmup_rows() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.5).sin()).collect();
        let frame = FeatureEngine::new().build(&series(&closes), None).unwrap();

        assert_eq!(FeatureConfig::default().warmup_rows(), 13);
        assert_eq!(frame.len(), 27);
        assert_eq!(frame.rows[0].date, date(13));
        assert_eq!(frame.rows[0].close, closes[13]);
    }

    #[test]
    fn test_dollar_fallback_is_mean_close() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let mean = closes.iter().sum::<f64>() / closes.len() as f64;

        let frame = FeatureEngine::new().build(&series(&closes), None).unwrap();
        assert!(frame.rows.iter().all(|r| r.dollar == mean));

        let empty = ReferenceSeries {
            symbol: "DX-Y.NYB".into(),
            points: vec![],
        };
        let frame = FeatureEngine::new()
            .build(&series(&closes), Some(&empty))
            .unwrap();
        assert!(frame.rows.iter().all(|r| r.dollar == mean));
    }

    #[test]
    fn test_reference_gap_rows_dropped() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        // 참조 지표가 20일째부터 시작
        let reference = ReferenceSeries {
            symbol: "DX-Y.NYB".into(),
            points: (20..30).map(|i| (date(i), 104.0 + i as f64)).collect(),
        };

        let frame = FeatureEngine::new()
            .build(&series(&closes), Some(&reference))
            .unwrap();
        assert_eq!(frame.len(), 10);
        assert_eq!(frame.rows[0].dollar, 124.0);
    }

    #[test]
    fn test_constant_series_features() {
        let frame = FeatureEngine::new()
            .build(&series(&[50.0; 40]), None)
            .unwrap();
        for row in &frame.rows {
            assert_eq!(row.rsi, 50.0);
            assert!(row.macd_hist.abs() < 1e-9);
            assert_eq!(row.volatility, 0.0);
            assert_eq!(row.close_ma, 50.0);
        }
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = FeatureEngine::new()
            .build(&RawSeries::new("KC=F", vec![]), None)
            .unwrap_err();
        assert!(matches!(err, MlError::InsufficientData { .. }));
    }
}
