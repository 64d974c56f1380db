pub mod ingestion;

pub use ingestion::{IngestionOrchestrator, IngestionRequest, IngestionStage, StageTrace};
