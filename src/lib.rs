pub mod analysis;
pub mod comparison;
pub mod embeddings;
pub mod error;
pub mod history;
pub mod keyphrase;
pub mod models;
pub mod paths;
pub mod preprocess;
pub mod projection;
pub mod providers;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use comparison::{compare, Classification, CompareConfig, ComparisonRecord};
pub use embeddings::{EmbeddingEngine, Metric};
pub use error::{EngineError, EngineResult};
pub use history::HistoryStore;
pub use keyphrase::{extract_keyphrases, KeyPhrase, KeyphraseExtractor};
pub use preprocess::preprocess;
pub use projection::project;
pub use session::Session;
pub use settings::Settings;
