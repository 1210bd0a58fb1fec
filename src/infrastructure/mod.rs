pub mod catalog;
pub mod email;
pub mod limiter;
pub mod utils;
