//! Services coordinating store operations for the request layer

pub mod fence_query;

pub use fence_query::{default_fence, FenceQueryService, DEFAULT_FENCE_NAME};
