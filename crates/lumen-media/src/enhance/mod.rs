//! Enhancement strategies.
//!
//! Two interchangeable implementations of a single capability, selected once
//! per run via [`EnhanceMethod`], never per frame and never by separate
//! scripts: a classical CLAHE operator and a learned UNet restorer.

mod clahe;
mod unet;

pub use clahe::ClaheEnhancer;
pub use unet::UnetEnhancer;

use lumen_models::EnhanceMethod;
use opencv::core::Mat;

use crate::error::MediaResult;
use crate::pipeline::PipelineConfig;

/// A strategy that turns one frame into an enhanced frame.
///
/// The output is always a fresh buffer with the same dimensions as the input;
/// the input is left untouched because it is also needed for the side-by-side
/// composite.
pub trait Enhancer {
    /// Human-readable strategy label for diagnostics.
    fn label(&self) -> &'static str;

    /// Enhance one BGR frame, returning a new frame of identical geometry.
    fn enhance(&mut self, frame: &Mat) -> MediaResult<Mat>;
}

/// Build the enhancer for the configured method.
///
/// The UNet strategy loads its own weights here, independent of the
/// classifier's; a load failure aborts the run before any frame is processed.
pub fn build_enhancer(
    method: EnhanceMethod,
    config: &PipelineConfig,
) -> MediaResult<Box<dyn Enhancer>> {
    match method {
        EnhanceMethod::Clahe => Ok(Box::new(ClaheEnhancer::new())),
        EnhanceMethod::Unet => Ok(Box::new(UnetEnhancer::load(&config.restorer_model)?)),
    }
}
