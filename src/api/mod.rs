pub mod balance;
pub mod department;
pub mod employee;
pub mod job;
pub mod leave;
pub mod leave_type;

// Helper enum for typed SQLx binding in dynamic list queries
pub(crate) enum FilterValue<'a> {
    I64(i64),
    Str(&'a str),
}
