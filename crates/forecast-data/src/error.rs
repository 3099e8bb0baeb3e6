//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 외부 시세 Provider 오류.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// 네트워크/연결 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API 응답 오류
    #[error("API error: {0}")]
    Api(String),

    /// 조회 결과 없음
    #[error("No data returned for {0}")]
    NoData(String),

    /// 존재하지 않는 심볼
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

impl ProviderError {
    /// 재시도 가능한 오류인지 확인.
    ///
    /// 빈 결과나 잘못된 심볼은 다시 요청해도 같은 결과가 나옵니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::RateLimited | ProviderError::Api(_)
        )
    }
}

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터가 없거나 학습에 필요한 길이보다 짧음
    #[error("Data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// 재시도 후에도 실패한 Provider 오류
    #[error("Provider error after {attempts} attempt(s): {source}")]
    Provider {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// 캐시 오류
    #[error("Cache error: {0}")]
    Cache(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// 데이터 부족 오류 생성.
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Network("reset".into()).is_retryable());
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Api("500".into()).is_retryable());
        assert!(!ProviderError::NoData("KC=F".into()).is_retryable());
        assert!(!ProviderError::InvalidSymbol("??".into()).is_retryable());
    }

    #[test]
    fn test_provider_error_message() {
        let err = DataError::Provider {
            attempts: 3,
            source: ProviderError::RateLimited,
        };
        assert_eq!(
            err.to_string(),
            "Provider error after 3 attempt(s): Rate limit exceeded"
        );
    }
}
