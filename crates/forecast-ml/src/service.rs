//! 예측 서비스 - 데이터 수집, feature 생성, 학습, 평가, 예측을 하나로 묶습니다.
//!
//! ```text
//! run_forecast(ticker)
//!   ├─ FeatureCache::get ──hit──────────────────────────────┐
//!   └─ miss: MarketDataLoader::load + ReferenceSeriesSource │
//!            └─ FeatureEngine::build ─▶ FeatureCache::put ──┤
//!                                                           ▼
//!            spawn_blocking: PreparedData ─▶ Trainer::fit ─▶ Evaluator
//!                                                           │
//!            ForecastChart::write (실패해도 계속) ◀──────────┘
//! ```
//!
//! 모델은 요청마다 새로 만들고 결과를 반환한 뒤 버립니다.

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::chart::ForecastChart;
use crate::dataset::PreparedData;
use crate::error::ForecastError;
use crate::evaluation::{EvaluationReport, Evaluator};
use crate::features::FeatureEngine;
use crate::model::LstmRegressorConfig;
use crate::training::{Trainer, TrainingReport};
use forecast_core::{
    AppConfig, Commodity, CoreResult, FeatureFrame, ForecastResult, ModelConfig, OutputConfig,
    TrainingConfig,
};
use forecast_data::{
    DataError, FeatureCache, MarketDataLoader, MarketDataProvider, ReferenceSeriesSource,
    RetryPolicy, YahooProvider,
};

/// 학습 작업의 결과.
struct PipelineOutcome {
    report: TrainingReport,
    evaluation: EvaluationReport,
    forecast: f64,
    last_date: NaiveDate,
    last_close: f64,
}

/// 종목 하나에 대한 다음 날 종가 예측 서비스.
pub struct ForecastService {
    loader: MarketDataLoader,
    reference: ReferenceSeriesSource,
    cache: FeatureCache,
    engine: FeatureEngine,
    model: ModelConfig,
    training: TrainingConfig,
    output: OutputConfig,
}

impl ForecastService {
    /// Yahoo Finance provider로 서비스를 구성합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self, ForecastError> {
        let provider = YahooProvider::new().map_err(|source| DataError::Provider {
            attempts: 1,
            source,
        })?;
        Ok(Self::with_provider(config, Arc::new(provider))?)
    }

    /// 지정한 provider로 서비스를 구성합니다.
    pub fn with_provider(
        config: &AppConfig,
        provider: Arc<dyn MarketDataProvider>,
    ) -> CoreResult<Self> {
        config.validate()?;

        let retry = RetryPolicy::from_config(&config.retry);
        let loader =
            MarketDataLoader::from_config(Arc::clone(&provider), retry.clone(), &config.data)?;
        let reference = ReferenceSeriesSource::new(provider, retry, &config.data.reference_symbol);
        let cache = FeatureCache::new(&config.data.cache_dir)
            .with_ttl(Duration::from_secs(config.data.cache_ttl_hours * 60 * 60));

        Ok(Self {
            loader,
            reference,
            cache,
            engine: FeatureEngine::new(),
            model: config.model.clone(),
            training: config.training.clone(),
            output: config.output.clone(),
        })
    }

    /// 차트 데이터 작성 여부를 지정합니다.
    pub fn with_chart(mut self, enabled: bool) -> Self {
        self.output.write_chart = enabled;
        self
    }

    /// Feature 캐시.
    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    /// 캐시된 프레임을 쓰거나, 새로 조회해 만들고 캐시에 저장합니다.
    async fn feature_frame(&self, ticker: &str) -> Result<FeatureFrame, ForecastError> {
        if let Some(frame) = self.cache.get(ticker) {
            debug!(ticker = %ticker, rows = frame.len(), "캐시된 feature 사용");
            return Ok(frame);
        }

        let series = self.loader.load(ticker).await?;
        let reference = self.reference.fetch(self.loader.start()).await;

        let frame = self
            .engine
            .build(&series, reference.as_ref())
            .map_err(ForecastError::training)?;
        self.cache.put(ticker, &frame);
        Ok(frame)
    }

    /// 다음 날 종가를 예측합니다.
    ///
    /// `verbose`이면 학습 진행 로그를 info 레벨로 남깁니다.
    #[instrument(skip(self), fields(window = self.model.window_len))]
    pub async fn run_forecast(
        &self,
        ticker: &str,
        verbose: bool,
    ) -> Result<ForecastResult, ForecastError> {
        info!(ticker = %ticker, "예측 시작");

        let frame = self.feature_frame(ticker).await?;
        let window_len = self.model.window_len;
        let training = self.training.clone();
        let model_config = LstmRegressorConfig::from_model_config(&self.model);

        let span = forecast_core::forecast_span!("train", ticker, "spawn_blocking");
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = span.enter();
            train_and_evaluate(&frame, window_len, training, model_config, verbose)
        })
        .await??;

        let chart_path = if self.output.write_chart {
            self.write_chart(ticker, &outcome)
        } else {
            None
        };

        let result = ForecastResult {
            ticker: ticker.to_string(),
            commodity_name: Commodity::by_ticker(ticker).map(|c| c.name.to_string()),
            current_price: outcome.last_close,
            next_day_forecast: outcome.forecast,
            rmse: outcome.evaluation.rmse,
            directional_accuracy: outcome.evaluation.directional_accuracy,
            training: outcome.report.summary(),
            generated_at: Utc::now(),
            chart_path,
        };

        info!(
            ticker = %ticker,
            current = result.current_price,
            forecast = result.next_day_forecast,
            rmse = result.rmse,
            accuracy = result.directional_accuracy,
            epochs = result.training.epochs_run,
            "예측 완료"
        );
        Ok(result)
    }

    fn write_chart(&self, ticker: &str, outcome: &PipelineOutcome) -> Option<PathBuf> {
        let chart = ForecastChart::build(
            ticker,
            &outcome.evaluation,
            outcome.last_date,
            outcome.last_close,
            outcome.forecast,
        );
        match chart.write(&self.output.chart_dir) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "차트 데이터 저장 실패");
                None
            }
        }
    }
}

/// CPU 작업: 스케일링/분할, 학습, 테스트 평가, 다음 날 예측.
fn train_and_evaluate(
    frame: &FeatureFrame,
    window_len: usize,
    training: TrainingConfig,
    model_config: LstmRegressorConfig,
    verbose: bool,
) -> Result<PipelineOutcome, ForecastError> {
    let prepared =
        PreparedData::from_frame(frame, window_len, training.train_ratio, training.val_ratio)
            .map_err(ForecastError::training)?;
    let last_close = frame.last_close().ok_or(ForecastError::InsufficientData {
        required: window_len + 1,
        actual: 0,
    })?;

    debug!(
        train = prepared.partition.train.len(),
        validation = prepared.partition.validation.len(),
        test = prepared.partition.test.len(),
        "데이터 분할"
    );

    let trained = Trainer::new(training, model_config)
        .with_verbose(verbose)
        .fit(&prepared.partition)
        .map_err(ForecastError::training)?;

    let evaluator = Evaluator::new(&trained.model, &prepared.scaler, Default::default());
    let evaluation = evaluator
        .evaluate(&prepared.partition.test)
        .map_err(ForecastError::evaluation)?;
    let forecast = evaluator
        .forecast_next(&prepared.latest)
        .map_err(ForecastError::evaluation)?;

    Ok(PipelineOutcome {
        report: trained.report,
        evaluation,
        forecast,
        last_date: prepared.last_date,
        last_close,
    })
}
