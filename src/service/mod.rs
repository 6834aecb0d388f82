pub mod aggregation;
pub mod dimension;
pub mod events;
pub mod evidence;
pub mod llm;
pub mod pipeline;
pub mod profile;
pub mod search;

pub use events::{event_channel, sse_stream};
pub use evidence::{EvidenceCollector, EvidenceConfig};
pub use llm::LlmClient;
pub use pipeline::{AssessmentPipeline, RunRegistry};
pub use search::{BraveSearchProvider, CacheStats, ThrottledSearchCache};
