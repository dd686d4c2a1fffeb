// Library root: cricket statistics corpus, points model and optimal-XI
// selection. The binary crate and integration tests use this public API.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod corpus;
pub mod optimizer;
pub mod role;
pub mod scoring;
pub mod selector;
pub mod summary;
