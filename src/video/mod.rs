//! 视频模块：单帧提取与深度伪造分类
pub mod capture;
pub mod inference;
pub mod classifier;

pub use self::capture::{CaptureGuard, FfmpegOpener, FrameSource, VideoOpener};
pub use self::inference::{HttpImageClassifier, ImageClassifier, Prediction};
pub use self::classifier::{FrameClassification, FrameClassifier};
