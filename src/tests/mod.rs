//! Internal test modules - whitebox tests with crate access
//!
//! Tests here exercise several modules together: parsing real-shaped log files,
//! rendering messages as JSON, and checking that secrets stay out of diagnostics.
