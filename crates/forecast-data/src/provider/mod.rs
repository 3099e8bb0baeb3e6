//! 시세 데이터 Provider.
//!
//! - `MarketDataProvider`: 일봉 시계열 조회 trait
//! - `YahooProvider`: Yahoo Finance 일봉 조회
//! - `StaticProvider`: 메모리에 보관한 시계열을 돌려주는 Provider (오프라인/테스트용)

pub mod yahoo;

pub use yahoo::YahooProvider;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ProviderError;
use forecast_core::{RawBar, RawSeries};

/// 일봉 시계열 Provider.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider 이름 (로그용).
    fn name(&self) -> &str;

    /// `[start, end]` 구간의 일봉을 조회합니다.
    ///
    /// 결과는 날짜순으로 정렬되고 중복 날짜가 제거된 상태여야 합니다.
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, ProviderError>;
}

/// 미리 등록한 시계열을 돌려주는 Provider.
///
/// 등록되지 않은 티커는 `NoData`를 반환합니다. 조회 횟수를 기록하므로
/// 캐시 적중 여부 확인에 쓸 수 있습니다.
#[derive(Debug, Default)]
pub struct StaticProvider {
    series: HashMap<String, Vec<RawBar>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticProvider {
    /// 빈 Provider 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 티커의 시계열 등록.
    pub fn with_series(mut self, ticker: impl Into<String>, bars: Vec<RawBar>) -> Self {
        self.series.insert(ticker.into(), bars);
        self
    }

    /// 티커별 조회 횟수.
    pub fn calls(&self, ticker: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(ticker).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(ticker.to_string()).or_insert(0) += 1;
        }

        let bars = self
            .series
            .get(ticker)
            .ok_or_else(|| ProviderError::NoData(ticker.to_string()))?;

        let bars: Vec<RawBar> = bars
            .iter()
            .filter(|bar| bar.date >= start && bar.date <= end)
            .copied()
            .collect();

        Ok(RawSeries::new(ticker, bars))
    }
}
