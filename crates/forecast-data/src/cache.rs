//! Feature 프레임 파일 캐시.
//!
//! 티커마다 `features_<key>.json` 파일 하나에 프레임과 작성 시각을 저장합니다.
//! 작성 후 TTL(기본 24시간)이 지나면 없는 것으로 취급합니다.
//!
//! 캐시 오류는 파이프라인을 멈추지 않습니다. 읽기 실패는 경고 후 `None`,
//! 쓰기 실패는 경고 후 무시합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DataError, Result};
use forecast_core::{ticker_key, FeatureFrame};

/// 기본 TTL (24시간).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const FILE_PREFIX: &str = "features_";
const FILE_SUFFIX: &str = ".json";

/// 저장 형식.
#[derive(Debug, Serialize)]
struct EnvelopeRef<'a> {
    ticker: &'a str,
    written_at: DateTime<Utc>,
    frame: &'a FeatureFrame,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ticker: String,
    written_at: DateTime<Utc>,
    frame: FeatureFrame,
}

/// 캐시 항목 요약.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    /// 종목 티커
    pub ticker: String,
    /// 작성 시각
    pub written_at: DateTime<Utc>,
    /// 행 개수
    pub rows: usize,
    /// TTL 이내 여부
    pub fresh: bool,
    /// 파일 경로
    pub path: PathBuf,
}

/// Feature 프레임 파일 캐시.
#[derive(Debug, Clone)]
pub struct FeatureCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FeatureCache {
    /// 기본 TTL로 캐시 생성.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// TTL 지정. 0이면 모든 항목이 만료된 것으로 취급합니다.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 캐시 디렉토리.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 티커의 캐시 파일 경로.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, ticker_key(ticker), FILE_SUFFIX))
    }

    fn is_fresh(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // 미래 시각(시계 오차)은 방금 작성된 것으로 봅니다
        let age = (now - written_at).to_std().unwrap_or(Duration::ZERO);
        age < self.ttl
    }

    fn read_envelope(path: &Path) -> Result<Envelope> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// TTL 이내의 프레임을 반환합니다.
    pub fn get(&self, ticker: &str) -> Option<FeatureFrame> {
        let path = self.path_for(ticker);
        if !path.exists() {
            debug!(ticker = %ticker, "캐시 없음");
            return None;
        }

        let envelope = match Self::read_envelope(&path) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(ticker = %ticker, path = %path.display(), error = %e, "캐시 읽기 실패");
                return None;
            }
        };

        // 키 충돌 (예: "KC=F"와 "KC_F")
        if !envelope.ticker.trim().eq_ignore_ascii_case(ticker.trim()) {
            debug!(
                ticker = %ticker,
                cached_ticker = %envelope.ticker,
                "다른 티커의 캐시 항목"
            );
            return None;
        }

        if !self.is_fresh(envelope.written_at, Utc::now()) {
            debug!(ticker = %ticker, written_at = %envelope.written_at, "캐시 만료");
            return None;
        }

        debug!(ticker = %ticker, rows = envelope.frame.len(), "캐시 적중");
        Some(envelope.frame)
    }

    fn write(&self, ticker: &str, frame: &FeatureFrame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(ticker);
        let envelope = EnvelopeRef {
            ticker,
            written_at: Utc::now(),
            frame,
        };
        std::fs::write(&path, serde_json::to_vec(&envelope)?)?;
        Ok(path)
    }

    /// 프레임을 저장합니다. 실패하면 경고만 남깁니다.
    pub fn put(&self, ticker: &str, frame: &FeatureFrame) {
        match self.write(ticker, frame) {
            Ok(path) => {
                debug!(ticker = %ticker, path = %path.display(), rows = frame.len(), "캐시 저장")
            }
            Err(e) => warn!(ticker = %ticker, error = %e, "캐시 저장 실패"),
        }
    }

    /// 티커의 캐시 항목을 삭제합니다. 삭제했으면 `true`.
    pub fn invalidate(&self, ticker: &str) -> Result<bool> {
        let path = self.path_for(ticker);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DataError::Io(e)),
        }
    }

    fn feature_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DataError::Io(e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_feature_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX))
                .unwrap_or(false);
            if is_feature_file && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// 모든 feature 캐시 파일을 삭제합니다. 삭제한 파일 수를 반환합니다.
    pub fn clear(&self) -> Result<usize> {
        let files = self.feature_files()?;
        for path in &files {
            std::fs::remove_file(path)?;
        }
        Ok(files.len())
    }

    /// 캐시 항목 목록. 읽을 수 없는 파일은 건너뜁니다.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let now = Utc::now();
        let mut entries = Vec::new();

        for path in self.feature_files()? {
            match Self::read_envelope(&path) {
                Ok(envelope) => entries.push(CacheEntry {
                    fresh: self.is_fresh(envelope.written_at, now),
                    ticker: envelope.ticker,
                    written_at: envelope.written_at,
                    rows: envelope.frame.len(),
                    path,
                }),
                Err(e) => warn!(path = %path.display(), error = %e, "손상된 캐시 파일"),
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_core::FeatureRow;

    fn frame(ticker: &str) -> FeatureFrame {
        let rows = (1..=3)
            .map(|day| FeatureRow {
                date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
                close: 100.0 + day as f64 * 0.1,
                close_ma: 100.0,
                rsi: 48.25,
                macd_hist: -0.0123,
                volatility: 0.37,
                volume: 12_000.0,
                dollar: 104.12,
            })
            .collect();
        FeatureFrame::new(ticker, rows)
    }

    #[test]
    fn test_path_for_uses_ticker_key() {
        let cache = FeatureCache::new("/tmp/cache");
        assert_eq!(
            cache.path_for("KC=F"),
            PathBuf::from("/tmp/cache/features_kc_f.json")
        );
    }

    #[test]
    fn test_is_fresh() {
        let cache = FeatureCache::new("unused");
        let now = Utc::now();
        assert!(cache.is_fresh(now - chrono::Duration::hours(23), now));
        assert!(!cache.is_fresh(now - chrono::Duration::hours(25), now));
        assert!(cache.is_fresh(now + chrono::Duration::minutes(5), now));

        let zero = FeatureCache::new("unused").with_ttl(Duration::ZERO);
        assert!(!zero.is_fresh(now, now));
    }

    #[test]
    fn test_put_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::new(dir.path());
        let frame = frame("GC=F");

        cache.put("GC=F", &frame);
        assert_eq!(cache.get("GC=F"), Some(frame));
        assert_eq!(cache.get("SI=F"), None);
    }

    #[test]
    fn test_corrupt_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::new(dir.path());
        std::fs::write(cache.path_for("CL=F"), b"{not json").unwrap();
        assert_eq!(cache.get("CL=F"), None);
    }

    #[test]
    fn test_key_collision_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FeatureCache::new(dir.path());
        cache.put("KC=F", &frame("KC=F"));
        assert_eq!(cache.get("KC_F"), None);
    }

    #[test]
    fn test_put_into_unwritable_dir_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        // 파일 아래에는 디렉토리를 만들 수 없음
        let cache = FeatureCache::new(blocker.join("cache"));
        cache.put("GC=F", &frame("GC=F"));
        assert_eq!(cache.get("GC=F"), None);
    }
}
