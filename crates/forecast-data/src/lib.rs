//! 시세 데이터 수집 및 캐시.
//!
//! 이 crate는 다음을 제공합니다:
//! - 일봉 시계열 Provider (`MarketDataProvider`, Yahoo Finance 구현)
//! - 재시도 정책 (`RetryPolicy`)
//! - 최소 길이 검사를 포함한 로더와 참조 지표(달러 인덱스) 조회
//! - TTL 기반 feature 프레임 파일 캐시

pub mod cache;
pub mod error;
pub mod loader;
pub mod provider;
pub mod retry;

pub use cache::{CacheEntry, FeatureCache, DEFAULT_TTL};
pub use error::{DataError, ProviderError, Result};
pub use loader::{MarketDataLoader, ReferenceSeriesSource, DEFAULT_MIN_ROWS};
pub use provider::{MarketDataProvider, StaticProvider, YahooProvider};
pub use retry::RetryPolicy;
