//! Test module for zod-gql
//!
//! Unit tests for the compiler, managed fields, enums, arguments and
//! methods, plus property-based tests using proptest.



#[cfg(test)]
pub mod enum_tests;

#[cfg(test)]
pub mod args_tests;

#[cfg(test)]
pub mod method_tests;
