//! Feature 캐시 조회 및 삭제.

use anyhow::{Context, Result};
use forecast_data::{CacheEntry, FeatureCache};
use tracing::info;

/// 캐시 항목 목록 (티커 필터 선택).
pub fn list_entries(cache: &FeatureCache, ticker: Option<&str>) -> Result<Vec<CacheEntry>> {
    let entries = cache
        .entries()
        .with_context(|| format!("Failed to read cache directory: {}", cache.dir().display()))?;

    Ok(match ticker {
        Some(t) => entries
            .into_iter()
            .filter(|e| e.ticker.eq_ignore_ascii_case(t))
            .collect(),
        None => entries,
    })
}

/// 캐시 삭제. 티커를 지정하면 해당 항목만 삭제합니다.
pub fn clear(cache: &FeatureCache, ticker: Option<&str>) -> Result<usize> {
    let removed = match ticker {
        Some(t) => usize::from(cache.invalidate(t).context("Failed to remove cache entry")?),
        None => cache.clear().context("Failed to clear cache")?,
    };
    info!(removed = removed, "Cache cleared");
    Ok(removed)
}

/// 테이블 형식 출력.
pub fn format_entries(entries: &[CacheEntry]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<12} {:<22} {:>6} {:<6}\n",
        "TICKER", "WRITTEN_AT", "ROWS", "FRESH"
    ));
    output.push_str(&"-".repeat(50));
    output.push('\n');

    for entry in entries {
        output.push_str(&format!(
            "{:<12} {:<22} {:>6} {:<6}\n",
            entry.ticker,
            entry.written_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.rows,
            if entry.fresh { "✓" } else { "✗" }
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} entries", entries.len()));
    output
}
