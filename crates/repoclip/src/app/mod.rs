//! Application layer orchestrating domain logic and infrastructure.

pub mod commit;
pub mod compile;
pub mod export;
pub mod ignore;
pub mod pipeline;
pub mod selection;
pub mod tokens;
pub mod walk;
