//! # Forecast Core
//!
//! 원자재 선물 가격 예측 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 OHLCV 시계열 (`RawSeries`)
//! - 기술 지표가 추가된 feature 프레임 (`FeatureFrame`)
//! - 예측 결과 레코드 (`ForecastResult`)
//! - 지원 원자재 카탈로그
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
