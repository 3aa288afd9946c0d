pub mod step;
pub mod view;

pub use step::StepId;
pub use view::{DisplayState, ProgressView};
