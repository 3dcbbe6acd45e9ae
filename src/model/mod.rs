pub mod attendance;
pub mod calendar;
pub mod employee;
pub mod employment;
pub mod role;
