pub mod department;
pub mod employee;
pub mod job;
pub mod leave_application;
pub mod leave_type;
