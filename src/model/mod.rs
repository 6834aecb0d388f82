pub mod config;
pub mod dimension;
pub mod evaluation;
pub mod events;
pub mod evidence;
pub mod findings;
pub mod profile;

pub use config::{Config, RetrieverConfig};
pub use dimension::*;
pub use evaluation::*;
pub use events::{EventKind, PipelineEvent};
pub use evidence::{Credibility, SearchHit, Source};
pub use profile::{DimensionImportance, RequirementProfile, ScaleAssumptions};
