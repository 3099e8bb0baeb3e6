//! 시세 로더.
//!
//! Provider 조회에 재시도 정책과 최소 길이 검사를 적용합니다.
//! 달러 인덱스 같은 참조 지표는 `ReferenceSeriesSource`로 조회하며,
//! 실패해도 파이프라인을 멈추지 않습니다.

use chrono::{Days, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{DataError, ProviderError, Result};
use crate::provider::MarketDataProvider;
use crate::retry::RetryPolicy;
use forecast_core::{DataConfig, RawSeries, ReferenceSeries};

/// 기본 최소 일봉 수.
pub const DEFAULT_MIN_ROWS: usize = 100;

/// 재시도와 최소 길이 검사를 적용하는 시세 로더.
pub struct MarketDataLoader {
    provider: Arc<dyn MarketDataProvider>,
    retry: RetryPolicy,
    start: NaiveDate,
    min_rows: usize,
}

impl MarketDataLoader {
    /// 새 로더 생성.
    pub fn new(provider: Arc<dyn MarketDataProvider>, retry: RetryPolicy, start: NaiveDate) -> Self {
        Self {
            provider,
            retry,
            start,
            min_rows: DEFAULT_MIN_ROWS,
        }
    }

    /// 설정으로 로더 생성.
    pub fn from_config(
        provider: Arc<dyn MarketDataProvider>,
        retry: RetryPolicy,
        config: &DataConfig,
    ) -> forecast_core::CoreResult<Self> {
        Ok(Self::new(provider, retry, config.start()?).with_min_rows(config.min_rows))
    }

    /// 최소 일봉 수 지정.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// 조회 시작일.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// 조회 종료일 (오늘 포함).
    fn end() -> NaiveDate {
        let today = Utc::now().date_naive();
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    }

    /// 시작일부터 오늘까지 일봉을 조회합니다.
    ///
    /// 재시도 후에도 결과가 없거나 `min_rows`보다 짧으면 `DataUnavailable`.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn load(&self, ticker: &str) -> Result<RawSeries> {
        let (start, end) = (self.start, Self::end());

        let series = self
            .retry
            .run(ticker, || {
                let provider = Arc::clone(&self.provider);
                async move { provider.fetch(ticker, start, end).await }
            })
            .await
            .map_err(|e| match e {
                DataError::Provider {
                    source: ProviderError::NoData(_) | ProviderError::InvalidSymbol(_),
                    ..
                } => DataError::unavailable(ticker, format!("{}", e)),
                other => other,
            })?;

        if series.is_empty() || series.len() < self.min_rows {
            warn!(
                ticker = %ticker,
                rows = series.len(),
                min_rows = self.min_rows,
                "일봉 데이터 부족"
            );
            return Err(DataError::unavailable(
                ticker,
                format!(
                    "insufficient history: {} rows (minimum {})",
                    series.len(),
                    self.min_rows
                ),
            ));
        }

        info!(ticker = %ticker, rows = series.len(), "일봉 로드 완료");
        Ok(series)
    }
}

/// 참조 지표(달러 인덱스) 조회.
///
/// 조회에 실패하면 경고만 남기고 `None`을 반환합니다.
pub struct ReferenceSeriesSource {
    provider: Arc<dyn MarketDataProvider>,
    retry: RetryPolicy,
    symbol: String,
}

impl ReferenceSeriesSource {
    /// 새 참조 지표 소스 생성.
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        retry: RetryPolicy,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            retry,
            symbol: symbol.into(),
        }
    }

    /// 참조 심볼.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// `start`부터 오늘까지 참조 지표를 조회합니다.
    pub async fn fetch(&self, start: NaiveDate) -> Option<ReferenceSeries> {
        let end = MarketDataLoader::end();
        let symbol = self.symbol.as_str();

        match self
            .retry
            .run(symbol, || {
                let provider = Arc::clone(&self.provider);
                async move { provider.fetch(symbol, start, end).await }
            })
            .await
        {
            Ok(series) if !series.is_empty() => Some(ReferenceSeries::from_series(&series)),
            Ok(_) => {
                warn!(symbol = %symbol, "참조 지표 데이터 없음, 대체값 사용");
                None
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "참조 지표 조회 실패, 대체값 사용");
                None
            }
        }
    }
}
