pub mod config;
pub mod deduplication;
pub mod event;
pub mod keywords;
pub mod matcher;
pub mod pipeline;
pub mod sinks;
pub mod status;
pub mod store;
pub mod stream;
pub mod supabase;
pub mod types;

// Re-export for tests
pub use matcher::Matcher;
pub use pipeline::Pipeline;
