pub mod api;
pub mod compare;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod personality;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use api::{CompanionClient, CompanionService};
pub use compare::compare_personalities;
pub use config::Config;
pub use error::{CompanionError, Result};
pub use memory::{extract_memory, load_sample};
pub use models::{
    HealthStatus, PersonalityComparison, PersonalityInfo, TransformRequest,
    TransformResponse, UserMemory,
};
pub use personality::{Catalog, Personality};
pub use session::{ChatSession, ChatView, SubmitOutcome, TurnStart};
pub use state::{ChatTurn, Sender, Transcript};
