//! 학습 루프와 조기 종료.
//!
//! epoch마다 `학습 → 검증 → 개선/미개선` 순으로 진행하며,
//! 연속 미개선 epoch 수가 patience에 도달하거나 최대 epoch에 이르면 끝납니다.
//! 검증 손실이 가장 낮았던 epoch의 모델 사본이 결과입니다.

use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn::tensor::ElementConversion;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{Partition, SequenceWindow};
use crate::error::{MlError, MlResult};
use crate::model::{
    windows_to_tensors, InferenceBackend, LstmRegressor, LstmRegressorConfig, TrainingBackend,
};
use forecast_core::{StopReason, TrainingConfig, TrainingSummary};

/// 검증 손실을 평가할 때의 배치 크기.
const EVAL_BATCH_SIZE: usize = 256;

/// 한 epoch의 검증 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochOutcome {
    /// 최저 검증 손실 갱신
    Improved,
    /// 갱신 없음
    NotImproved,
}

/// 조기 종료 추적기.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_loss: Option<f64>,
    best_epoch: Option<usize>,
    epochs_seen: usize,
    since_improvement: usize,
}

impl EarlyStopping {
    /// 새 추적기 생성.
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_loss: None,
            best_epoch: None,
            epochs_seen: 0,
            since_improvement: 0,
        }
    }

    /// epoch의 검증 손실을 기록합니다.
    ///
    /// 유한하고 지금까지의 최저값보다 작을 때만 개선으로 봅니다.
    pub fn observe(&mut self, val_loss: f64) -> EpochOutcome {
        let epoch = self.epochs_seen;
        self.epochs_seen += 1;

        let improved = val_loss.is_finite() && self.best_loss.map_or(true, |best| val_loss < best);
        if improved {
            self.best_loss = Some(val_loss);
            self.best_epoch = Some(epoch);
            self.since_improvement = 0;
            EpochOutcome::Improved
        } else {
            self.since_improvement += 1;
            EpochOutcome::NotImproved
        }
    }

    /// patience만큼 연속으로 개선이 없었는지 확인.
    pub fn should_stop(&self) -> bool {
        self.since_improvement >= self.patience
    }

    /// 최저 검증 손실.
    pub fn best_loss(&self) -> Option<f64> {
        self.best_loss
    }

    /// 최저 검증 손실의 epoch (0부터).
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// 마지막 개선 이후 epoch 수.
    pub fn epochs_since_improvement(&self) -> usize {
        self.since_improvement
    }
}

/// epoch 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// epoch (0부터)
    pub epoch: usize,
    /// 적용된 학습률
    pub learning_rate: f64,
    /// 학습 배치 평균 손실
    pub train_loss: f64,
    /// 검증 손실
    pub val_loss: f64,
    /// 최저 검증 손실 갱신 여부
    pub improved: bool,
}

/// 학습 결과 보고서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// 실행된 epoch 수
    pub epochs_run: usize,
    /// 최적 epoch
    pub best_epoch: usize,
    /// 최적 검증 손실
    pub best_val_loss: f64,
    /// 종료 사유
    pub stop_reason: StopReason,
    /// epoch별 기록
    pub history: Vec<EpochRecord>,
}

impl TrainingReport {
    /// 결과 레코드용 요약.
    pub fn summary(&self) -> TrainingSummary {
        TrainingSummary {
            epochs_run: self.epochs_run,
            best_epoch: self.best_epoch,
            best_val_loss: self.best_val_loss,
            stop_reason: self.stop_reason,
        }
    }
}

/// step 방식 학습률: `lr0 · gamma^⌊epoch / step⌋`.
pub fn learning_rate_at(config: &TrainingConfig, epoch: usize) -> f64 {
    let step = config.lr_decay_step.max(1);
    config.learning_rate * config.lr_decay_gamma.powi((epoch / step) as i32)
}

/// 학습된 모델과 보고서.
#[derive(Debug)]
pub struct TrainedModel {
    /// 최저 검증 손실 시점의 모델 (추론 backend)
    pub model: LstmRegressor<InferenceBackend>,
    /// 학습 보고서
    pub report: TrainingReport,
}

/// 검증 구간 MSE.
pub fn mean_squared_error<B: Backend>(
    model: &LstmRegressor<B>,
    windows: &[SequenceWindow],
    device: &B::Device,
) -> MlResult<f64> {
    if windows.is_empty() {
        return Err(MlError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let mut total = 0.0;
    for chunk in windows.chunks(EVAL_BATCH_SIZE) {
        let refs: Vec<&SequenceWindow> = chunk.iter().collect();
        let (inputs, targets) = windows_to_tensors::<B>(&refs, device)?;
        let loss = MseLoss::new().forward(model.forward(inputs), targets, Reduction::Sum);
        total += loss.into_scalar().elem::<f64>();
    }
    Ok(total / windows.len() as f64)
}

/// 학습기.
pub struct Trainer {
    config: TrainingConfig,
    model_config: LstmRegressorConfig,
    verbose: bool,
}

impl Trainer {
    /// 새 학습기 생성.
    pub fn new(config: TrainingConfig, model_config: LstmRegressorConfig) -> Self {
        Self {
            config,
            model_config,
            verbose: false,
        }
    }

    /// 진행 로그를 info 레벨로 출력.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn log_progress(&self, record: &EpochRecord) {
        if self.verbose {
            info!(
                epoch = record.epoch,
                train_loss = record.train_loss,
                val_loss = record.val_loss,
                lr = record.learning_rate,
                "Epoch {}, Train Loss: {:.4}, Val Loss: {:.4}",
                record.epoch,
                record.train_loss,
                record.val_loss
            );
        } else {
            debug!(
                epoch = record.epoch,
                train_loss = record.train_loss,
                val_loss = record.val_loss,
                lr = record.learning_rate,
                "학습 진행"
            );
        }
    }

    /// 한 epoch 학습. 배치 평균 손실과 갱신된 모델을 반환합니다.
    fn train_epoch<O>(
        &self,
        mut model: LstmRegressor<TrainingBackend>,
        optim: &mut O,
        train: &[SequenceWindow],
        order: &[usize],
        learning_rate: f64,
        device: &<TrainingBackend as Backend>::Device,
    ) -> MlResult<(LstmRegressor<TrainingBackend>, f64)>
    where
        O: Optimizer<LstmRegressor<TrainingBackend>, TrainingBackend>,
    {
        let mut loss_sum = 0.0;
        let mut batches = 0usize;

        for batch in order.chunks(self.config.batch_size.max(1)) {
            let refs: Vec<&SequenceWindow> = batch.iter().map(|&i| &train[i]).collect();
            let (inputs, targets) = windows_to_tensors::<TrainingBackend>(&refs, device)?;

            let output = model.forward(inputs);
            let loss = MseLoss::new().forward(output, targets, Reduction::Mean);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(learning_rate, model, grads);
        }

        Ok((model, loss_sum / batches.max(1) as f64))
    }

    /// 분할 데이터로 새 모델을 학습합니다.
    ///
    /// 검증 손실이 한 번도 개선되지 않으면 (예: 모든 손실이 NaN) `MlError::Training`.
    pub fn fit(&self, partition: &Partition) -> MlResult<TrainedModel> {
        self.model_config.validate()?;
        if partition.train.is_empty() || partition.validation.is_empty() {
            return Err(MlError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        let device = <TrainingBackend as Backend>::Device::default();
        TrainingBackend::seed(self.config.seed);
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut model = self.model_config.init::<TrainingBackend>(&device);
        let mut optim = AdamConfig::new().init::<TrainingBackend, LstmRegressor<TrainingBackend>>();

        let mut stopper = EarlyStopping::new(self.config.patience);
        let mut best: Option<LstmRegressor<InferenceBackend>> = None;
        let mut history = Vec::with_capacity(self.config.epochs);
        let mut stop_reason = StopReason::MaxEpochsReached;
        let mut order: Vec<usize> = (0..partition.train.len()).collect();

        for epoch in 0..self.config.epochs {
            let learning_rate = learning_rate_at(&self.config, epoch);
            order.shuffle(&mut rng);

            let (trained, train_loss) = self.train_epoch(
                model,
                &mut optim,
                &partition.train,
                &order,
                learning_rate,
                &device,
            )?;
            model = trained;

            // 검증은 dropout이 꺼진 내부 backend에서
            let snapshot = model.valid();
            let val_loss = mean_squared_error(&snapshot, &partition.validation, &device)?;

            let outcome = stopper.observe(val_loss);
            if outcome == EpochOutcome::Improved {
                best = Some(snapshot);
            }

            let record = EpochRecord {
                epoch,
                learning_rate,
                train_loss,
                val_loss,
                improved: outcome == EpochOutcome::Improved,
            };
            if self.config.log_every > 0 && epoch % self.config.log_every == 0 {
                self.log_progress(&record);
            }
            history.push(record);

            if stopper.should_stop() {
                stop_reason = StopReason::PatienceExhausted;
                debug!(epoch = epoch, patience = self.config.patience, "조기 종료");
                break;
            }
        }

        let (model, best_epoch, best_val_loss) =
            match (best, stopper.best_epoch(), stopper.best_loss()) {
                (Some(model), Some(epoch), Some(loss)) => (model, epoch, loss),
                _ => {
                    return Err(MlError::Training(format!(
                        "검증 손실이 {} epoch 동안 한 번도 개선되지 않았습니다",
                        history.len()
                    )))
                }
            };

        let report = TrainingReport {
            epochs_run: history.len(),
            best_epoch,
            best_val_loss,
            stop_reason,
            history,
        };

        Ok(TrainedModel { model, report })
    }
}
