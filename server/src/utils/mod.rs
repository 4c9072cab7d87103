//! Utility functions for the application

pub mod number;
pub mod time;
