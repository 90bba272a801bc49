//! CLI Commands

pub mod clean;
pub mod compare;
pub mod list;
