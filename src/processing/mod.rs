mod compressor;
mod resample;
mod validation;

pub use compressor::SizeTargetCompressor;
pub use resample::Resampler;
pub use validation::ImageValidator;
