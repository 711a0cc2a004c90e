#![deny(unreachable_patterns)]
//! Low-light video enhancement pipeline.
//!
//! This crate provides:
//! - Frame sampling from a video source with temporal subsampling
//! - Per-frame light-condition classification (ConvNeXt binary head, ONNX)
//! - Two interchangeable enhancement strategies (CLAHE and a UNet restorer)
//! - Side-by-side frame compositing and XVID encoding
//! - The pipeline driver state machine and its run summary contract
//! - FFprobe metadata probing used by the run orchestrator

#[cfg(feature = "opencv")]
pub mod classifier;
#[cfg(feature = "opencv")]
pub mod compositor;
#[cfg(feature = "opencv")]
pub mod enhance;
pub mod error;
pub mod onnx;
#[cfg(feature = "opencv")]
pub mod pipeline;
pub mod probe;
#[cfg(feature = "opencv")]
pub mod sampler;
#[cfg(feature = "opencv")]
pub mod tensor;

#[cfg(feature = "opencv")]
pub use classifier::{Classification, LightClassifier};
#[cfg(feature = "opencv")]
pub use compositor::compose_side_by_side;
#[cfg(feature = "opencv")]
pub use enhance::{build_enhancer, ClaheEnhancer, Enhancer, UnetEnhancer};
pub use error::{MediaError, MediaResult};
#[cfg(feature = "opencv")]
pub use pipeline::{PipelineConfig, PipelineDriver, PipelineState};
pub use probe::{probe_video, VideoInfo};
#[cfg(feature = "opencv")]
pub use sampler::{FrameSampler, SampledFrame};
