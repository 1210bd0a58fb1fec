pub mod forms;
pub mod home;
pub mod system;
pub mod vehicles;
