pub mod feature;
pub mod identifier;
pub mod lang;
pub mod model;
pub mod network;
pub mod offset_map;
pub mod script;
pub mod span;
pub mod squeeze;
pub mod tables;
pub mod utf8;

pub use identifier::{Identification, LanguageIdentifier};
pub use lang::UNKNOWN;
pub use model::{ModelError, NetworkParams};
pub use network::EmbeddingNetwork;
pub use span::{LangSpan, ScriptSpanScanner, SpanBuffers};
