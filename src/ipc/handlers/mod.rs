pub mod backup;
pub mod core;
pub mod records;
pub mod student;
