//! End-to-end test for the forecasting pipeline.
//!
//! Uses an in-memory provider and a small model so the whole
//! fetch → features → train → evaluate → forecast path runs in seconds:
//! 1. A 120-day increasing series produces a finite forecast
//! 2. The second run is served from the feature cache
//! 3. A 50-day series is rejected as unavailable

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

use forecast_core::{AppConfig, RawBar, RetryConfig};
use forecast_data::StaticProvider;
use forecast_ml::{ForecastChart, ForecastError, ForecastService};

fn small_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.cache_dir = dir.join("cache");
    config.output.chart_dir = dir.join("charts");
    config.retry = RetryConfig::immediate(1);
    config.model.window_len = 10;
    config.model.hidden_size = 8;
    config.model.num_layers = 1;
    config.training.epochs = 3;
    config.training.patience = 2;
    config.training.batch_size = 16;
    config.training.log_every = 1;
    config
}

fn increasing_bars(days: usize) -> Vec<RawBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..days)
        .map(|i| {
            let close = 100.0 + i as f64 + (i as f64 * 0.3).sin();
            RawBar::new(
                start + chrono::Duration::days(i as i64),
                close - 0.5,
                close + 1.0,
                close - 1.0,
                close,
                10_000.0 + (i % 7) as f64 * 100.0,
            )
        })
        .collect()
}

#[tokio::test]
async fn test_increasing_series_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let provider = Arc::new(StaticProvider::new().with_series("KC=F", increasing_bars(120)));
    let service = ForecastService::with_provider(&config, provider.clone()).unwrap();

    let result = service.run_forecast("KC=F", true).await.unwrap();

    assert_eq!(result.ticker, "KC=F");
    assert_eq!(result.commodity_name.as_deref(), Some("Café Arábica"));
    assert!(result.next_day_forecast.is_finite());
    assert!(result.next_day_forecast > 0.0);
    assert!(result.rmse >= 0.0);
    assert!((0.0..=1.0).contains(&result.directional_accuracy));
    assert!(result.training.epochs_run >= 1 && result.training.epochs_run <= 3);
    assert!(result.training.best_epoch < result.training.epochs_run);

    let last_close = increasing_bars(120).last().unwrap().close;
    assert_eq!(result.current_price, last_close);

    // 차트 데이터 파일
    let chart_path = result.chart_path.expect("chart written");
    assert!(chart_path.starts_with(dir.path().join("charts")));
    let chart: ForecastChart =
        serde_json::from_slice(&std::fs::read(&chart_path).unwrap()).unwrap();
    assert_eq!(chart.actual.len(), chart.predicted.len());
    assert!(!chart.actual.is_empty() && chart.actual.len() <= 60);
    assert!((chart.next_day.y - result.next_day_forecast).abs() < 1e-9);

    // 두 번째 실행은 캐시 사용
    assert!(service.cache().path_for("KC=F").exists());
    let again = service.run_forecast("KC=F", false).await.unwrap();
    assert_eq!(provider.calls("KC=F"), 1);
    assert_eq!(again.current_price, result.current_price);
}

#[tokio::test]
async fn test_short_series_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let provider = Arc::new(StaticProvider::new().with_series("GC=F", increasing_bars(50)));
    let service = ForecastService::with_provider(&config, provider).unwrap();

    let err = service.run_forecast("GC=F", false).await.unwrap_err();

    assert!(err.is_data_unavailable());
    assert!(matches!(err, ForecastError::Data(_)));
    assert!(err.to_string().contains("GC=F"));
}

#[tokio::test]
async fn test_unknown_ticker_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let service =
        ForecastService::with_provider(&config, Arc::new(StaticProvider::new())).unwrap();

    let err = service.run_forecast("XX=F", false).await.unwrap_err();
    assert!(err.is_data_unavailable());
}

#[tokio::test]
async fn test_chart_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let provider = Arc::new(StaticProvider::new().with_series("CL=F", increasing_bars(110)));
    let service = ForecastService::with_provider(&config, provider)
        .unwrap()
        .with_chart(false);

    let result = service.run_forecast("CL=F", false).await.unwrap();

    assert!(result.chart_path.is_none());
    assert!(!dir.path().join("charts").exists());
}
