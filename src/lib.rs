pub mod downspout;
mod error;
pub mod gutter;
pub mod hydrology;
mod inputs;
mod reference_data;
mod sizing;

pub use downspout::{DownspoutSizing, DownspoutWarning, FlowRegime};
pub use error::{GutterInfeasibility, ReferenceDataError, SizingError, SizingErrorKind};
pub use gutter::GutterSection;
pub use hydrology::Hydrology;
pub use inputs::{GutterShape, MIN_DOWNSPOUTS, SizingInput};
pub use reference_data::{ReferenceData, SemicircularGutter};
pub use sizing::{SizingEngine, SizingReport, SizingResult};
