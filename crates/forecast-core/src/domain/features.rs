//! Feature 프레임 타입.
//!
//! 일봉 시계열에 기술 지표를 추가한 학습용 테이블입니다.
//! 컬럼 순서는 고정이며, 스케일러와 역변환이 이 순서에 의존합니다.
//! 0번 컬럼은 항상 예측 대상(종가)입니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Feature 컬럼 수.
pub const FEATURE_COUNT: usize = 7;

/// 예측 대상 컬럼 인덱스 (종가).
pub const TARGET_COLUMN: usize = 0;

/// 고정 컬럼 순서.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "close",
    "close_ma",
    "rsi",
    "macd_hist",
    "volatility",
    "volume",
    "dollar",
];

/// Feature 프레임의 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: f64,
    /// 종가 7일 이동평균
    pub close_ma: f64,
    /// RSI(14)
    pub rsi: f64,
    /// MACD 히스토그램 (12, 26, 9)
    pub macd_hist: f64,
    /// 종가 14일 표준편차
    pub volatility: f64,
    /// 거래량
    pub volume: f64,
    /// 달러 인덱스 (forward-fill 또는 대체값)
    pub dollar: f64,
}

impl FeatureRow {
    /// 고정 컬럼 순서의 벡터로 변환.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.close,
            self.close_ma,
            self.rsi,
            self.macd_hist,
            self.volatility,
            self.volume,
            self.dollar,
        ]
    }
}

/// 한 종목의 feature 프레임.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    /// 종목 티커
    pub ticker: String,
    /// 날짜순 행 목록
    pub rows: Vec<FeatureRow>,
}

impl FeatureFrame {
    /// 새 프레임 생성.
    pub fn new(ticker: impl Into<String>, rows: Vec<FeatureRow>) -> Self {
        Self {
            ticker: ticker.into(),
            rows,
        }
    }

    /// 행 개수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 고정 컬럼 순서의 행렬.
    pub fn matrix(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.rows.iter().map(FeatureRow::values).collect()
    }

    /// 마지막 종가 (현재가).
    pub fn last_close(&self) -> Option<f64> {
        self.rows.last().map(|r| r.close)
    }

    /// 마지막 거래일.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, close: f64) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close,
            close_ma: close - 1.0,
            rsi: 55.0,
            macd_hist: 0.1,
            volatility: 0.5,
            volume: 1200.0,
            dollar: 104.0,
        }
    }

    #[test]
    fn test_values_follow_column_order() {
        let values = row(1, 10.0).values();
        assert_eq!(values[TARGET_COLUMN], 10.0);
        assert_eq!(values[1], 9.0);
        assert_eq!(values[6], 104.0);
        assert_eq!(FEATURE_COLUMNS[TARGET_COLUMN], "close");
    }

    #[test]
    fn test_frame_accessors() {
        let frame = FeatureFrame::new("CL=F", vec![row(1, 70.0), row(2, 71.5)]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.last_close(), Some(71.5));
        assert_eq!(frame.matrix().len(), 2);
        assert_eq!(
            frame.last_date(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );
    }
}
