//! Yahoo Finance 일봉 Provider.
//!
//! 선물 티커는 Yahoo Finance 형식 그대로 사용합니다 (예: "KC=F", "GC=F").
//! 달러 인덱스 같은 참조 지표도 같은 Provider로 조회합니다 (예: "DX-Y.NYB").
//!
//! ```rust,ignore
//! use forecast_data::provider::{MarketDataProvider, YahooProvider};
//!
//! let provider = YahooProvider::new()?;
//! let series = provider.fetch("KC=F", start, end).await?;
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

use super::MarketDataProvider;
use crate::error::ProviderError;
use forecast_core::{RawBar, RawSeries};

/// Yahoo Finance 일봉 Provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// 새 Provider 생성.
    pub fn new() -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| ProviderError::Network(format!("Yahoo Finance 연결 실패: {}", e)))?;

        Ok(Self { connector })
    }

    /// 날짜를 Yahoo API가 받는 UTC 자정 시각으로 변환.
    fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime, ProviderError> {
        let timestamp = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| ProviderError::Api(format!("잘못된 날짜: {}", date)))?;

        time::OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|e| ProviderError::Api(format!("잘못된 날짜 {}: {}", date, e)))
    }

    /// Yahoo 오류 메시지를 Provider 오류로 분류.
    fn classify_error(ticker: &str, message: String) -> ProviderError {
        let lower = message.to_lowercase();
        if lower.contains("429") || lower.contains("too many requests") {
            ProviderError::RateLimited
        } else if lower.contains("404") || lower.contains("not found") {
            ProviderError::InvalidSymbol(ticker.to_string())
        } else if lower.contains("connect") || lower.contains("timed out") {
            ProviderError::Network(message)
        } else {
            ProviderError::Api(format!("Yahoo Finance API 오류 ({}): {}", ticker, message))
        }
    }

    /// Yahoo Quote를 일봉으로 변환. 시각이 잘못되었거나 종가가 없는 Quote는 버립니다.
    fn quote_to_bar(quote: &yahoo::Quote) -> Option<RawBar> {
        let date = Utc
            .timestamp_opt(quote.timestamp as i64, 0)
            .single()?
            .date_naive();

        if !quote.close.is_finite() || quote.close <= 0.0 {
            return None;
        }

        Some(RawBar::new(
            date,
            quote.open,
            quote.high,
            quote.low,
            quote.close,
            quote.volume as f64,
        ))
    }
}

// `new()`가 `Result`를 반환하므로 Default는 구현하지 않습니다.

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, ProviderError> {
        info!(ticker = %ticker, start = %start, end = %end, "Yahoo Finance 일봉 조회");

        let response = self
            .connector
            .get_quote_history(
                ticker,
                Self::to_offset_datetime(start)?,
                Self::to_offset_datetime(end)?,
            )
            .await
            .map_err(|e| Self::classify_error(ticker, e.to_string()))?;

        // 빈 결과는 quotes()가 오류로 돌려줍니다
        let quotes = response.quotes().map_err(|e| {
            debug!(ticker = %ticker, error = %e, "Quote 파싱 실패");
            ProviderError::NoData(ticker.to_string())
        })?;

        let total = quotes.len();
        let bars: Vec<RawBar> = quotes.iter().filter_map(Self::quote_to_bar).collect();

        if bars.is_empty() {
            warn!(ticker = %ticker, "Yahoo Finance: 데이터 없음");
            return Err(ProviderError::NoData(ticker.to_string()));
        }
        if bars.len() < total {
            debug!(
                ticker = %ticker,
                dropped = total - bars.len(),
                "종가가 없는 Quote 제외"
            );
        }

        let series = RawSeries::new(ticker, bars);
        debug!(ticker = %ticker, bars = series.len(), "Yahoo Finance 일봉 수신");

        Ok(series)
    }
}
