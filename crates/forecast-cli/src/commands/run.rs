//! 다음 날 종가 예측 실행.

use anyhow::{Context, Result};
use forecast_core::{AppConfig, ForecastResult};
use forecast_ml::ForecastService;
use tracing::info;

/// 예측 실행 설정.
#[derive(Debug)]
pub struct RunConfig {
    /// 종목 티커 (예: KC=F)
    pub ticker: String,
    /// 학습 진행 로그 출력
    pub verbose: bool,
    /// 차트 데이터 작성 여부
    pub write_chart: bool,
    /// JSON 출력
    pub json: bool,
}

/// 예측을 실행하고 결과를 출력합니다.
pub async fn run_forecast(app: &AppConfig, config: RunConfig) -> Result<ForecastResult> {
    let ticker = config.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        anyhow::bail!("Ticker must not be empty");
    }

    let service = ForecastService::from_config(app)
        .context("Failed to build forecast service")?
        .with_chart(app.output.write_chart && config.write_chart);

    info!(ticker = %ticker, "Running forecast");
    let result = service
        .run_forecast(&ticker, config.verbose)
        .await
        .with_context(|| format!("Forecast failed for {}", ticker))?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_result(&result));
    }

    Ok(result)
}

/// 결과를 사람이 읽는 형식으로 변환.
pub fn format_result(result: &ForecastResult) -> String {
    let mut output = String::new();

    let title = match &result.commodity_name {
        Some(name) => format!("{} ({})", name, result.ticker),
        None => result.ticker.clone(),
    };
    output.push_str(&format!("{}\n", title));
    output.push_str(&"-".repeat(44));
    output.push('\n');

    let change = result.expected_change_pct();
    let arrow = if change > 0.0 {
        "▲"
    } else if change < 0.0 {
        "▼"
    } else {
        "="
    };

    output.push_str(&format!("{:<24} {:>18.4}\n", "현재가", result.current_price));
    output.push_str(&format!(
        "{:<24} {:>18.4}\n",
        "다음 날 예측", result.next_day_forecast
    ));
    output.push_str(&format!("{:<24} {:>16.2}% {}\n", "예상 변동", change, arrow));
    output.push_str(&format!("{:<24} {:>18.4}\n", "RMSE", result.rmse));
    output.push_str(&format!(
        "{:<24} {:>17.1}%\n",
        "방향 정확도",
        result.directional_accuracy * 100.0
    ));
    output.push_str(&format!(
        "{:<24} {:>18}\n",
        "학습 epoch",
        format!(
            "{} (best {}, {})",
            result.training.epochs_run, result.training.best_epoch, result.training.stop_reason
        )
    ));

    if let Some(path) = &result.chart_path {
        output.push_str(&format!("\n차트 데이터: {}", path.display()));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forecast_core::{StopReason, TrainingSummary};

    fn result(name: Option<&str>) -> ForecastResult {
        ForecastResult {
            ticker: "KC=F".to_string(),
            commodity_name: name.map(str::to_string),
            current_price: 200.0,
            next_day_forecast: 210.0,
            rmse: 4.5,
            directional_accuracy: 0.5,
            training: TrainingSummary {
                epochs_run: 9,
                best_epoch: 1,
                best_val_loss: 0.01,
                stop_reason: StopReason::PatienceExhausted,
            },
            generated_at: Utc::now(),
            chart_path: None,
        }
    }

    #[test]
    fn test_format_result() {
        let text = format_result(&result(Some("Café Arábica")));
        assert!(text.starts_with("Café Arábica (KC=F)"));
        assert!(text.contains("5.00% ▲"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("early_stop"));
        assert!(!text.contains("차트 데이터"));
    }

    #[test]
    fn test_format_result_unknown_ticker() {
        let text = format_result(&result(None));
        assert!(text.starts_with("KC=F\n"));
    }
}
