#![allow(unreachable_pub)]

mod error;
mod patient;
mod query;

pub use error::ErrorKind;
pub use patient::{Admission, NewPatient, Patient, PatientDetails, PatientPage, Recommendation, Stats};
pub use query::{Gender, PAGE_SIZE, QueryDescriptor};

/// The medidash `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;
