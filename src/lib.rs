// Core modules
pub mod audio;
pub mod chapters;
pub mod config;
pub mod config_file;
pub mod dependencies;
pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod matchers;
pub mod planner;
pub mod progress;
pub mod rebuild;
pub mod splicer;
pub mod tags;
pub mod timeline;

// Re-export commonly used types
pub use audio::{AudioBuffer, AudioFormat};
pub use chapters::{ChapterFrame, OriginalChapter, RebuiltChapter, TagFrame, TagSet, TocEntry};
pub use config::{Config, ConfigBuilder};
pub use config_file::{ConfigFile, ProfileConfig};
pub use engine::{remove_chapters, EditOutcome, RunSummary};
pub use error::{ChapcutError, Result, Stage};
pub use ffmpeg::{AudioCodec, FfmpegCodec};
pub use matchers::{ChapterMatcher, MatchMode};
pub use planner::{plan, plan_with_filter, ChapterPlan};
pub use progress::{ProgressOperation, ProgressTracker};
pub use timeline::{extract, Timeline};
