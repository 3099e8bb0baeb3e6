//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 다음 날 종가 예측 실행
//! - 지원 원자재 카탈로그 조회
//! - Feature 캐시 관리

pub mod commands;

pub use commands::*;
