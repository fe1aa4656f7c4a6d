//! Core domain types and logic.

pub mod series;
pub mod merge;
pub mod periodicity;
pub mod returns;
pub mod combo;
pub mod stats;
pub mod correlation;
pub mod analysis;
pub mod settings;
pub mod error;
