//! proctor-providers: question generators and result sinks.
//!
//! Implements the `QuestionProvider` and `ResultSink` traits from
//! `proctor-core` for static exam files, OpenAI-compatible generators, HTTP
//! results backends, and local JSON-lines history.

pub mod config;
pub mod error;
pub mod file_sink;
pub mod http_sink;
pub mod mock;
pub mod openai;
pub mod static_bank;

pub use config::{
    create_generator, create_sink, load_config, load_config_from, GeneratorConfig, ProctorConfig,
    SinkConfig,
};
pub use error::ProviderError;
pub use file_sink::{load_history, JsonlResultSink};
pub use http_sink::HttpResultSink;
pub use static_bank::StaticBankProvider;
