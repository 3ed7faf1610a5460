//! Property-based tests grouped by area

mod connection_info_tests;
mod error_tests;
mod properties_format_tests;
mod vault_tests;
