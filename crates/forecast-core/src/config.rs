//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 모든 항목에 기본값이 있으므로 설정 파일이 없어도 동작합니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 데이터 수집/캐시 설정
    pub data: DataConfig,
    /// 재시도 정책 설정
    pub retry: RetryConfig,
    /// 모델 구조 설정
    pub model: ModelConfig,
    /// 학습 설정
    pub training: TrainingConfig,
    /// 출력 설정
    pub output: OutputConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 데이터 수집 및 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 캐시 디렉토리
    pub cache_dir: PathBuf,
    /// 캐시 TTL (시간)
    pub cache_ttl_hours: u64,
    /// 조회 시작일 (YYYY-MM-DD)
    pub start_date: String,
    /// 참조 지표 심볼 (달러 인덱스)
    pub reference_symbol: String,
    /// 최소 일봉 수
    pub min_rows: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            cache_ttl_hours: 24,
            start_date: "2023-01-01".to_string(),
            reference_symbol: "DX-Y.NYB".to_string(),
            min_rows: 100,
        }
    }
}

impl DataConfig {
    /// 캐시 TTL.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_ttl_hours as i64)
    }

    /// 조회 시작일 파싱.
    pub fn start(&self) -> CoreResult<NaiveDate> {
        NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").map_err(|e| {
            CoreError::Config(format!("잘못된 start_date '{}': {}", self.start_date, e))
        })
    }
}

/// 외부 조회 재시도 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 백오프 기준 대기 (밀리초)
    pub base_delay_ms: u64,
    /// 백오프 지터 최대값 (밀리초)
    pub max_jitter_ms: u64,
    /// 매 시도 전 최소 대기 (밀리초)
    pub throttle_min_ms: u64,
    /// 매 시도 전 최대 대기 (밀리초)
    pub throttle_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_jitter_ms: 500,
            throttle_min_ms: 500,
            throttle_max_ms: 1500,
        }
    }
}

impl RetryConfig {
    /// 대기 없이 즉시 재시도하는 설정 (테스트용).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_jitter_ms: 0,
            throttle_min_ms: 0,
            throttle_max_ms: 0,
        }
    }

    /// 백오프 기준 대기.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// LSTM 모델 구조 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 입력 시퀀스 길이
    pub window_len: usize,
    /// 은닉 차원
    pub hidden_size: usize,
    /// LSTM 레이어 수
    pub num_layers: usize,
    /// 레이어 사이 dropout 비율
    pub dropout: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            window_len: 45,
            hidden_size: 128,
            num_layers: 2,
            dropout: 0.2,
        }
    }
}

/// 학습 루프 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// 최대 epoch
    pub epochs: usize,
    /// 연속 미개선 허용 epoch 수
    pub patience: usize,
    /// 미니배치 크기
    pub batch_size: usize,
    /// 초기 학습률
    pub learning_rate: f64,
    /// 학습률 감소 주기 (epoch)
    pub lr_decay_step: usize,
    /// 학습률 감소 배수
    pub lr_decay_gamma: f64,
    /// 학습 구간 비율
    pub train_ratio: f64,
    /// 검증 구간 비율
    pub val_ratio: f64,
    /// 난수 시드
    pub seed: u64,
    /// 진행 로그 주기 (epoch)
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 25,
            patience: 7,
            batch_size: 32,
            learning_rate: 3e-4,
            lr_decay_step: 10,
            lr_decay_gamma: 0.8,
            train_ratio: 0.70,
            val_ratio: 0.15,
            seed: 42,
            log_every: 5,
        }
    }
}

impl TrainingConfig {
    /// 설정 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.epochs == 0 || self.batch_size == 0 || self.patience == 0 {
            return Err(CoreError::Config(
                "epochs, batch_size, patience는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.lr_decay_step == 0 {
            return Err(CoreError::Config(
                "lr_decay_step은 0보다 커야 합니다".to_string(),
            ));
        }
        let split = self.train_ratio + self.val_ratio;
        if self.train_ratio <= 0.0 || self.val_ratio <= 0.0 || split >= 1.0 {
            return Err(CoreError::Config(format!(
                "잘못된 분할 비율: train {} + val {} (합은 1 미만이어야 함)",
                self.train_ratio, self.val_ratio
            )));
        }
        Ok(())
    }
}

/// 출력 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 차트 데이터 디렉토리
    pub chart_dir: PathBuf,
    /// 차트 데이터 작성 여부
    pub write_chart: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_dir: PathBuf::from("charts"),
            write_chart: true,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// 환경 변수 형식: `FORECAST__TRAINING__EPOCHS=10`.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("FORECAST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        self.data.start()?;
        self.training.validate()?;
        if self.model.window_len == 0 || self.model.hidden_size == 0 || self.model.num_layers == 0
        {
            return Err(CoreError::Config(
                "window_len, hidden_size, num_layers는 0보다 커야 합니다".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.model.dropout) {
            return Err(CoreError::Config(format!(
                "dropout은 [0, 1) 범위여야 합니다: {}",
                self.model.dropout
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(CoreError::Config(
                "retry.max_attempts는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.retry.throttle_min_ms > self.retry.throttle_max_ms {
            return Err(CoreError::Config(
                "retry.throttle_min_ms가 throttle_max_ms보다 큽니다".to_string(),
            ));
        }
        Ok(())
    }
}
