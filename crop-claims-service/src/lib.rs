pub mod checks;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod service;
pub mod submission;
pub mod telemetry;
pub mod verification;

pub use config::ServiceConfig;
pub use error::{ClaimError, ModelError};
pub use evaluator::evaluate;
pub use models::*;
pub use service::{AppState, build_router, create_app};
pub use verification::ClaimVerificationService;
