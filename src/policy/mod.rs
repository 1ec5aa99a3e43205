//! Admission policy for guarded routes.

pub mod admission;
