//! 외부 조회 재시도 정책.
//!
//! 매 시도 전에 `[throttle_min, throttle_max]` 구간의 무작위 대기를 두고,
//! 재시도 가능한 실패 뒤에는 `base · 2^(attempt−1)` + 지터만큼 기다립니다.
//! 재시도 불가능한 오류는 즉시 반환합니다.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DataError, ProviderError};
use forecast_core::RetryConfig;

/// 재시도 정책.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 백오프 기준 대기
    pub base_delay: Duration,
    /// 백오프 지터 최대값
    pub max_jitter: Duration,
    /// 시도 전 최소 대기
    pub throttle_min: Duration,
    /// 시도 전 최대 대기
    pub throttle_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// 설정에서 생성.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
            throttle_min: Duration::from_millis(config.throttle_min_ms),
            throttle_max: Duration::from_millis(config.throttle_max_ms.max(config.throttle_min_ms)),
        }
    }

    /// 대기 없이 재시도하는 정책.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::from_config(&RetryConfig::immediate(max_attempts))
    }

    /// `attempt`번째 실패 뒤의 백오프 (지터 제외).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    fn jitter(&self) -> Duration {
        random_between(Duration::ZERO, self.max_jitter)
    }

    fn throttle(&self) -> Duration {
        random_between(self.throttle_min, self.throttle_max)
    }

    /// 작업을 정책에 따라 실행합니다.
    ///
    /// 최종 실패 시 시도 횟수와 마지막 오류를 담은 `DataError::Provider`를 반환합니다.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, DataError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 1;
        loop {
            let throttle = self.throttle();
            if !throttle.is_zero() {
                tokio::time::sleep(throttle).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt) + self.jitter();
                    debug!(
                        target_name = label,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "조회 재시도 예정"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        target_name = label,
                        attempts = attempt,
                        retryable = e.is_retryable(),
                        error = %e,
                        "조회 최종 실패"
                    );
                    return Err(DataError::Provider {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}

fn random_between(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_is_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_random_between_bounds() {
        let min = Duration::from_millis(500);
        let max = Duration::from_millis(1500);
        for _ in 0..100 {
            let d = random_between(min, max);
            assert!(d >= min && d <= max);
        }
        assert_eq!(random_between(max, min), max);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::immediate(3);

        let result = policy
            .run("KC=F", || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(ProviderError::Network("reset".into()))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::immediate(3);

        let err = policy
            .run("KC=F", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::RateLimited)
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, DataError::Provider { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::immediate(3);

        let err = policy
            .run("ZZ=F", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ProviderError::NoData("ZZ=F".into()))
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            err,
            DataError::Provider {
                attempts: 1,
                source: ProviderError::NoData(_)
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::ZERO,
            throttle_min: Duration::from_millis(500),
            throttle_max: Duration::from_millis(500),
        };
        let started = tokio::time::Instant::now();

        let _ = policy
            .run("KC=F", || async {
                Err::<(), _>(ProviderError::Network("reset".into()))
            })
            .await;

        // throttle 500 + backoff 1000 + throttle 500
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
    }
}
