pub mod catalog;
pub mod extractors;
pub mod spam;
pub mod submission;
