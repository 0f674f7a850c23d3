//! Core data model for extras packages.

pub mod package;

pub use package::Package;
