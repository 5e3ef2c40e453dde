//! Data access for the job board's entities.
//!
//! Each entity module owns its schema, its input validation, and its column
//! map for partial updates. Operations take the database handle explicitly;
//! mutations additionally take the caller and are admin-gated.

pub mod company;
pub mod job;
