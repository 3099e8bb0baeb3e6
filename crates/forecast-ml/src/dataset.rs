//! 스케일링, 시퀀스 윈도우, 시간순 분할.
//!
//! ```text
//! FeatureFrame ──fit──▶ MinMaxScaler ──transform──▶ scaled rows
//!                                                     │
//!                      build_windows(W) ◀─────────────┤
//!                            │                        │
//!                  Partition::split(0.70, 0.15)   latest_window(W)
//! ```
//!
//! 스케일러는 전체 프레임으로 fit합니다. 검증/테스트 구간의 범위가
//! 학습에 노출되는 것은 알려진 한계입니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};
use forecast_core::{FeatureFrame, FEATURE_COUNT, TARGET_COLUMN};

/// 한 행의 feature 값.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// 컬럼별 min-max 스케일러.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: FeatureVector,
    max: FeatureVector,
}

impl MinMaxScaler {
    /// 모든 행으로 컬럼별 최소/최대를 계산합니다.
    pub fn fit(rows: &[FeatureVector]) -> MlResult<Self> {
        if rows.is_empty() {
            return Err(MlError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let mut min = [f64::INFINITY; FEATURE_COUNT];
        let mut max = [f64::NEG_INFINITY; FEATURE_COUNT];
        for (i, row) in rows.iter().enumerate() {
            for (col, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(MlError::InvalidInput(format!(
                        "{}행 {}열: 유한하지 않은 값",
                        i, col
                    )));
                }
                min[col] = min[col].min(value);
                max[col] = max[col].max(value);
            }
        }

        Ok(Self { min, max })
    }

    /// 컬럼 범위. 범위가 0이면 1.
    fn scale(&self, col: usize) -> f64 {
        let range = self.max[col] - self.min[col];
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    /// 컬럼별 최소값.
    pub fn min(&self) -> &FeatureVector {
        &self.min
    }

    /// 컬럼별 최대값.
    pub fn max(&self) -> &FeatureVector {
        &self.max
    }

    /// 한 행을 [0, 1] 구간으로 변환.
    pub fn transform_row(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (col, value) in row.iter().enumerate() {
            out[col] = (value - self.min[col]) / self.scale(col);
        }
        out
    }

    /// 모든 행 변환.
    pub fn transform(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// 한 행을 원래 단위로 역변환.
    pub fn inverse_row(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (col, value) in row.iter().enumerate() {
            out[col] = value * self.scale(col) + self.min[col];
        }
        out
    }

    /// 스케일된 종가 하나를 가격 단위로 역변환.
    ///
    /// 나머지 컬럼을 0으로 채운 행을 역변환하고 대상 컬럼만 취합니다.
    pub fn inverse_target(&self, value: f64) -> f64 {
        let mut row = [0.0; FEATURE_COUNT];
        row[TARGET_COLUMN] = value;
        self.inverse_row(&row)[TARGET_COLUMN]
    }
}

/// 길이 W의 입력 시퀀스와 다음 행의 스케일된 종가.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWindow {
    /// 입력 행 (길이 W)
    pub inputs: Vec<FeatureVector>,
    /// 윈도우 바로 다음 행의 스케일된 종가
    pub label: f64,
    /// 레이블 행의 날짜
    pub target_date: NaiveDate,
}

/// 스케일된 행으로 슬라이딩 윈도우(간격 1)를 만듭니다.
///
/// N행에서 N − W개의 윈도우가 나오며, i번째 윈도우는 `[i, i+W)` 행을 입력으로,
/// `i+W` 행의 종가를 레이블로 가집니다. N < W + 1이면 `InsufficientData`.
pub fn build_windows(
    scaled: &[FeatureVector],
    dates: &[NaiveDate],
    window_len: usize,
) -> MlResult<Vec<SequenceWindow>> {
    if window_len == 0 {
        return Err(MlError::InvalidInput("윈도우 길이는 0보다 커야 합니다".into()));
    }
    if scaled.len() != dates.len() {
        return Err(MlError::InvalidInput(format!(
            "행 수({})와 날짜 수({})가 다릅니다",
            scaled.len(),
            dates.len()
        )));
    }
    if scaled.len() < window_len + 1 {
        return Err(MlError::InsufficientData {
            required: window_len + 1,
            actual: scaled.len(),
        });
    }

    Ok((0..scaled.len() - window_len)
        .map(|i| SequenceWindow {
            inputs: scaled[i..i + window_len].to_vec(),
            label: scaled[i + window_len][TARGET_COLUMN],
            target_date: dates[i + window_len],
        })
        .collect())
}

/// 예측용 마지막 W행.
pub fn latest_window(scaled: &[FeatureVector], window_len: usize) -> MlResult<Vec<FeatureVector>> {
    if window_len == 0 || scaled.len() < window_len {
        return Err(MlError::InsufficientData {
            required: window_len.max(1),
            actual: scaled.len(),
        });
    }
    Ok(scaled[scaled.len() - window_len..].to_vec())
}

/// 시간순 학습/검증/테스트 분할.
#[derive(Debug, Clone)]
pub struct Partition {
    /// 학습 구간
    pub train: Vec<SequenceWindow>,
    /// 검증 구간
    pub validation: Vec<SequenceWindow>,
    /// 테스트 구간
    pub test: Vec<SequenceWindow>,
}

impl Partition {
    /// 구간별 크기 계산: (floor(n·train), floor(n·val), 나머지).
    pub fn sizes(total: usize, train_ratio: f64, val_ratio: f64) -> (usize, usize, usize) {
        let train = (total as f64 * train_ratio).floor() as usize;
        let val = (total as f64 * val_ratio).floor() as usize;
        let train = train.min(total);
        let val = val.min(total - train);
        (train, val, total - train - val)
    }

    /// 세 구간이 모두 비지 않는 최소 윈도우 수.
    pub fn minimum_windows(train_ratio: f64, val_ratio: f64) -> usize {
        (3..=100_000)
            .find(|&n| {
                let (train, val, test) = Self::sizes(n, train_ratio, val_ratio);
                train > 0 && val > 0 && test > 0
            })
            .unwrap_or(usize::MAX)
    }

    /// 윈도우를 순서대로 나눕니다. 섞지 않습니다.
    pub fn split(
        mut windows: Vec<SequenceWindow>,
        train_ratio: f64,
        val_ratio: f64,
    ) -> MlResult<Self> {
        let total = windows.len();
        let (train, val, test) = Self::sizes(total, train_ratio, val_ratio);
        if train == 0 || val == 0 || test == 0 {
            return Err(MlError::InsufficientData {
                required: Self::minimum_windows(train_ratio, val_ratio),
                actual: total,
            });
        }

        let test_part = windows.split_off(train + val);
        let validation = windows.split_off(train);
        Ok(Self {
            train: windows,
            validation,
            test: test_part,
        })
    }

    /// 전체 윈도우 수.
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 학습 한 번에 필요한 데이터 묶음.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// 전체 프레임으로 fit한 스케일러
    pub scaler: MinMaxScaler,
    /// 시간순 분할
    pub partition: Partition,
    /// 다음 날 예측용 마지막 윈도우
    pub latest: Vec<FeatureVector>,
    /// 마지막 거래일
    pub last_date: NaiveDate,
}

impl PreparedData {
    /// 프레임에서 스케일링, 윈도우, 분할을 수행합니다.
    pub fn from_frame(
        frame: &FeatureFrame,
        window_len: usize,
        train_ratio: f64,
        val_ratio: f64,
    ) -> MlResult<Self> {
        if frame.len() < window_len + 1 {
            return Err(MlError::InsufficientData {
                required: window_len + 1,
                actual: frame.len(),
            });
        }

        let matrix = frame.matrix();
        let dates: Vec<NaiveDate> = frame.rows.iter().map(|r| r.date).collect();
        let scaler = MinMaxScaler::fit(&matrix)?;
        let scaled = scaler.transform(&matrix);

        let windows = build_windows(&scaled, &dates, window_len)?;
        let partition = Partition::split(windows, train_ratio, val_ratio)?;
        let latest = latest_window(&scaled, window_len)?;
        let last_date = frame.last_date().ok_or(MlError::InsufficientData {
            required: window_len + 1,
            actual: 0,
        })?;

        Ok(Self {
            scaler,
            partition,
            latest,
            last_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rows(n: usize) -> Vec<FeatureVector> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                [x, x * 2.0, 50.0, -x, 1.0, 1000.0 + x, 104.0]
            })
            .collect()
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_scaler_constant_column() {
        let scaler = MinMaxScaler::fit(&rows(10)).unwrap();
        let scaled = scaler.transform_row(&rows(10)[3]);

        // 2번 열(50.0 고정)은 범위 0 → 0으로 변환, 역변환 시 최소값
        assert_eq!(scaled[2], 0.0);
        assert_eq!(scaler.inverse_row(&scaled)[2], 50.0);
        assert_eq!(scaled[0], 3.0 / 9.0);
    }

    #[test]
    fn test_inverse_target() {
        let scaler = MinMaxScaler::fit(&rows(11)).unwrap();
        assert!((scaler.inverse_target(0.5) - 5.0).abs() < 1e-12);
        assert_eq!(scaler.inverse_target(0.0), 0.0);
    }

    #[test]
    fn test_scaler_rejects_empty_and_nan() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        let mut bad = rows(3);
        bad[1][4] = f64::NAN;
        assert!(matches!(
            MinMaxScaler::fit(&bad),
            Err(MlError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_windows_count_and_labels() {
        let scaled = rows(60);
        let windows = build_windows(&scaled, &dates(60), 45).unwrap();

        assert_eq!(windows.len(), 15);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.inputs.len(), 45);
            assert_eq!(w.inputs[0], scaled[i]);
            assert_eq!(w.label, scaled[i + 45][TARGET_COLUMN]);
            assert_eq!(w.target_date, dates(60)[i + 45]);
        }
    }

    #[test]
    fn test_build_windows_too_short() {
        let err = build_windows(&rows(45), &dates(45), 45).unwrap_err();
        assert!(matches!(
            err,
            MlError::InsufficientData {
                required: 46,
                actual: 45
            }
        ));
        assert_eq!(build_windows(&rows(46), &dates(46), 45).unwrap().len(), 1);
    }

    #[test]
    fn test_partition_sizes() {
        assert_eq!(Partition::sizes(100, 0.7, 0.15), (70, 15, 15));
        assert_eq!(Partition::sizes(62, 0.7, 0.15), (43, 9, 10));
        assert_eq!(Partition::sizes(10, 0.7, 0.15), (7, 1, 2));
    }

    #[test]
    fn test_partition_chronological() {
        let windows = build_windows(&rows(80), &dates(80), 10).unwrap();
        let partition = Partition::split(windows.clone(), 0.7, 0.15).unwrap();

        assert_eq!(partition.len(), windows.len());
        let rejoined: Vec<_> = partition
            .train
            .iter()
            .chain(&partition.validation)
            .chain(&partition.test)
            .cloned()
            .collect();
        assert_eq!(rejoined, windows);
        assert!(partition.train.last().unwrap().target_date
            < partition.validation[0].target_date);
    }

    #[test]
    fn test_partition_empty_part_rejected() {
        let windows = build_windows(&rows(8), &dates(8), 3).unwrap();
        // 5개 → (3, 0, 2)
        let err = Partition::split(windows, 0.7, 0.15).unwrap_err();
        assert!(matches!(
            err,
            MlError::InsufficientData {
                required: 7,
                actual: 5
            }
        ));
    }

    #[test]
    fn test_latest_window() {
        let scaled = rows(50);
        let latest = latest_window(&scaled, 45).unwrap();
        assert_eq!(latest.len(), 45);
        assert_eq!(latest[44], scaled[49]);
        assert!(latest_window(&scaled, 51).is_err());
    }

    proptest! {
        #[test]
        fn prop_scaler_roundtrip(
            values in proptest::collection::vec(
                proptest::array::uniform7(-1.0e6f64..1.0e6),
                1..40,
            )
        ) {
            let scaler = MinMaxScaler::fit(&values).unwrap();
            for row in &values {
                let scaled = scaler.transform_row(row);
                for v in scaled {
                    prop_assert!((-1e-9..=1.0 + 1e-9).contains(&v));
                }
                let restored = scaler.inverse_row(&scaled);
                for (a, b) in row.iter().zip(restored.iter()) {
                    prop_assert!((a - b).abs() <= 1e-6 * (1.0 + a.abs()));
                }
            }
        }
    }
}
