pub mod error;
pub mod formats;

pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use formats::{ImageFormat, detect_format};
