pub mod attendance;
pub mod calendar;
pub mod caller;
pub mod employee;
