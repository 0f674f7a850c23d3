//! The local project manifest and the dependency resolver behind it.

pub mod composer;

pub use composer::{constraint_for, Composer, MANIFEST_NAME};
