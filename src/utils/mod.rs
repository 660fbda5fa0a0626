//! Shared math and time helpers

pub mod time_utils;
pub mod vector_math;
