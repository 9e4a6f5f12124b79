//! Chunk planning, parallel scheduling and progress reporting.

mod planner;
pub mod progress;
mod scheduler;

pub use planner::{ChunkPlanner, BYTES_PER_MB};
pub use progress::{
    LogProgress, NoProgress, ProgressConfig, ProgressEvent, ProgressSink, ProgressTracker,
};
pub use scheduler::{ChunkOutput, ChunkScheduler};
