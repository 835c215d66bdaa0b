// Data models module
// Rust structs that map to rows in the card database

pub mod actor;
pub mod card;

// Re-export all models for convenience
pub use actor::*;
pub use card::*;
