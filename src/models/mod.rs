pub mod enums;
pub mod patient;

pub use enums::PatientStatus;
pub use patient::*;
