//! Statistics and derivation core for a youth-football team tracker:
//! normalized entity collections, pure aggregation over match records,
//! per-entity career resolvers, and validation of AI-extracted match
//! candidates before commit.

pub mod aggregate;
pub mod ai_fetch;
pub mod entity_stats;
pub mod http_client;
pub mod persist;
pub mod store;
pub mod validate;
