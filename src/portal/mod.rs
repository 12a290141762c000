// src/portal/mod.rs

//! Knowledge about the ILIAS markup: which links mean what and where the
//! metadata of an item lives.

pub mod classifier;
pub mod courses;
pub mod media;
pub mod pages;
pub mod properties;

pub use classifier::classify;
pub use properties::{FileProperties, extract_file_properties};
