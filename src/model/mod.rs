//! Version-independent domain model: works, chapters, release states and the
//! caller-owned progress token.

mod chapter;
mod progress;
mod status;
mod work;

pub use chapter::{Chapter, ChapterLocator, compare_numeric_aware};
pub use progress::ProgressToken;
pub use status::ReleaseStatus;
pub use work::{CoverImage, Work};
