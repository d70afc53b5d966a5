//! Application layer orchestrating domain logic and infrastructure.

pub mod bundle;
pub mod export;
pub mod ignore_files;
pub mod patterns;
pub mod pipeline;
pub mod scan;
pub mod tree;
