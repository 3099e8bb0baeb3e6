//! 시장 데이터 타입.
//!
//! - `RawBar` - 일봉 OHLCV 데이터
//! - `RawSeries` - 한 종목의 날짜순 일봉 시계열
//! - `ReferenceSeries` - 참조 지표 시계열 (예: 달러 인덱스 종가)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 일봉 OHLCV 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
}

impl RawBar {
    /// 새 일봉을 생성합니다.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 한 종목의 일봉 시계열.
///
/// 날짜는 항상 엄격하게 증가합니다 (중복 없음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    ticker: String,
    bars: Vec<RawBar>,
}

impl RawSeries {
    /// 일봉 목록으로 시계열을 생성합니다.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜가 여러 개면 마지막 일봉만 남깁니다.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<RawBar>) -> Self {
        // stable sort: 같은 날짜는 입력 순서 유지
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<RawBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    /// 종목 티커.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// 일봉 슬라이스.
    pub fn bars(&self) -> &[RawBar] {
        &self.bars
    }

    /// 일봉 개수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 거래량 목록.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// 날짜 목록.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// 마지막 종가.
    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// 종가 평균.
    pub fn mean_close(&self) -> Option<f64> {
        if self.bars.is_empty() {
            return None;
        }
        Some(self.bars.iter().map(|b| b.close).sum::<f64>() / self.bars.len() as f64)
    }
}

/// 참조 지표 시계열 (날짜, 종가).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSeries {
    /// 참조 심볼 (예: "DX-Y.NYB")
    pub symbol: String,
    /// 날짜순 (날짜, 종가) 목록
    pub points: Vec<(NaiveDate, f64)>,
}

impl ReferenceSeries {
    /// 일봉 시계열에서 종가만 추출하여 생성합니다.
    pub fn from_series(series: &RawSeries) -> Self {
        Self {
            symbol: series.ticker().to_string(),
            points: series.bars().iter().map(|b| (b.date, b.close)).collect(),
        }
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> RawBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        RawBar::new(date, close, close, close, close, 1000.0)
    }

    #[test]
    fn test_raw_series_sorted_and_deduplicated() {
        let series = RawSeries::new(
            "KC=F",
            vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0), bar(3, 30.0)],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 30.0]);
        for pair in series.bars().windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_raw_series_stats() {
        let series = RawSeries::new("GC=F", vec![bar(1, 10.0), bar(2, 20.0)]);
        assert_eq!(series.last_close(), Some(20.0));
        assert_eq!(series.mean_close(), Some(15.0));

        let empty = RawSeries::new("GC=F", Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.mean_close(), None);
    }

    #[test]
    fn test_reference_from_series() {
        let series = RawSeries::new("DX-Y.NYB", vec![bar(1, 104.0), bar(2, 105.0)]);
        let reference = ReferenceSeries::from_series(&series);
        assert_eq!(reference.symbol, "DX-Y.NYB");
        assert_eq!(reference.points.len(), 2);
        assert_eq!(reference.points[1].1, 105.0);
    }
}
