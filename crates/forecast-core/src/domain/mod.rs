//! 예측 파이프라인의 도메인 모델.

mod features;
mod forecast;
mod market_data;

pub use features::*;
pub use forecast::*;
pub use market_data::*;
