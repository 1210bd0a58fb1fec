pub mod contact;
pub mod email;
pub mod reservation;
pub mod submission;
pub mod vehicle;
