//! 예측 차트 데이터.
//!
//! 테스트 구간 마지막 60개 지점의 실제/예측 종가와 다음 날 예측점을
//! 프론트엔드가 그대로 그릴 수 있는 JSON으로 저장합니다.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MlError, MlResult};
use crate::evaluation::EvaluationReport;
use forecast_core::ticker_key;

/// 차트에 남기는 최근 테스트 지점 수.
pub const CHART_POINTS: usize = 60;

/// 차트 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// X축 값 (타임스탬프, 밀리초)
    pub x: i64,

    /// Y축 값
    pub y: f64,

    /// 레이블 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChartPoint {
    /// 날짜(UTC 자정)와 값으로 생성.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            x: date_millis(date),
            y: value,
            label: None,
        }
    }

    /// 레이블이 있는 차트 포인트를 생성합니다.
    pub fn with_label(date: NaiveDate, value: f64, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new(date, value)
        }
    }
}

fn date_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// 주말을 건너뛴 다음 거래일.
pub fn next_trading_day(date: NaiveDate) -> NaiveDate {
    let mut next = date.checked_add_days(Days::new(1)).unwrap_or(date);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next = next.checked_add_days(Days::new(1)).unwrap_or(next);
    }
    next
}

/// 종목 하나의 예측 차트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastChart {
    /// 종목 티커
    pub ticker: String,
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 실제 종가 (테스트 구간)
    pub actual: Vec<ChartPoint>,
    /// 예측 종가 (테스트 구간)
    pub predicted: Vec<ChartPoint>,
    /// 마지막 거래일 종가
    pub last_day: ChartPoint,
    /// 다음 거래일 예측
    pub next_day: ChartPoint,
}

impl ForecastChart {
    /// 평가 결과와 예측값으로 차트를 구성합니다.
    pub fn build(
        ticker: &str,
        report: &EvaluationReport,
        last_date: NaiveDate,
        last_close: f64,
        forecast: f64,
    ) -> Self {
        let skip = report.dates.len().saturating_sub(CHART_POINTS);
        let series = |values: &[f64]| -> Vec<ChartPoint> {
            report
                .dates
                .iter()
                .zip(values)
                .skip(skip)
                .map(|(&d, &v)| ChartPoint::new(d, v))
                .collect()
        };

        Self {
            ticker: ticker.to_string(),
            generated_at: Utc::now(),
            actual: series(&report.actual),
            predicted: series(&report.predicted),
            last_day: ChartPoint::with_label(last_date, last_close, "last"),
            next_day: ChartPoint::with_label(next_trading_day(last_date), forecast, "forecast"),
        }
    }

    /// 파일 이름: `<ticker_key>_predictions.json`.
    pub fn file_name(ticker: &str) -> String {
        format!("{}_predictions.json", ticker_key(ticker))
    }

    /// `dir` 아래에 JSON으로 저장하고 경로를 반환합니다.
    pub fn write(&self, dir: &Path) -> MlResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .map_err(|e| MlError::InvalidInput(format!("{}: {}", dir.display(), e)))?;

        let path = dir.join(Self::file_name(&self.ticker));
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| MlError::InvalidInput(format!("차트 직렬화 실패: {}", e)))?;
        std::fs::write(&path, json)
            .map_err(|e| MlError::InvalidInput(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), points = self.actual.len(), "차트 데이터 저장");
        Ok(path)
    }
}
