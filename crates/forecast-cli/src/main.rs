//! 원자재 선물 다음 날 종가 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 아라비카 커피 선물 예측
//! forecast run --ticker KC=F
//!
//! # 학습 진행 로그와 JSON 출력
//! forecast run --ticker GC=F --verbose --json
//!
//! # 에너지 섹터 종목 목록
//! forecast list --sector energy
//!
//! # 캐시 확인 및 삭제
//! forecast cache list
//! forecast cache clear --ticker KC=F
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{init_logging, AppConfig, LogConfig};
use forecast_data::FeatureCache;
use tracing::error;

use forecast_cli::commands::{cache, list, run};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "원자재 선물 다음 날 종가 예측 (LSTM)", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 하나의 다음 날 종가 예측
    Run {
        /// Yahoo Finance 선물 티커 (예: KC=F, GC=F)
        #[arg(short, long)]
        ticker: String,

        /// 학습 진행 로그 출력
        #[arg(short, long, default_value = "false")]
        verbose: bool,

        /// 차트 데이터 파일을 만들지 않음
        #[arg(long, default_value = "false")]
        no_chart: bool,

        /// 결과를 JSON으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 지원 원자재 목록 보기
    List {
        /// 섹터 필터 (metals, energy, grains, livestock, softs, other)
        #[arg(short, long)]
        sector: Option<String>,
    },

    /// Feature 캐시 관리
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// 캐시 항목 보기
    List {
        /// 티커 필터
        #[arg(short, long)]
        ticker: Option<String>,
    },

    /// 캐시 삭제 (티커 미지정 시 전체)
    Clear {
        /// 삭제할 티커
        #[arg(short, long)]
        ticker: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let app = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration: {}", cli.config))?;

    init_logging(LogConfig::from_settings(&app.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Run {
            ticker,
            verbose,
            no_chart,
            json,
        } => {
            let config = run::RunConfig {
                ticker,
                verbose,
                write_chart: !no_chart,
                json,
            };
            if let Err(e) = run::run_forecast(&app, config).await {
                error!("Forecast failed: {:#}", e);
                return Err(e);
            }
        }

        Commands::List { sector } => {
            let commodities = list::list_commodities(sector.as_deref())?;
            println!("{}", list::format_table(&commodities));
        }

        Commands::Cache { action } => {
            let feature_cache = FeatureCache::new(&app.data.cache_dir).with_ttl(
                std::time::Duration::from_secs(app.data.cache_ttl_hours * 60 * 60),
            );

            match action {
                CacheAction::List { ticker } => {
                    let entries = cache::list_entries(&feature_cache, ticker.as_deref())?;
                    println!("{}", cache::format_entries(&entries));
                }
                CacheAction::Clear { ticker } => {
                    let removed = cache::clear(&feature_cache, ticker.as_deref())?;
                    println!("캐시 삭제 완료: {} 항목", removed);
                }
            }
        }
    }

    Ok(())
}
