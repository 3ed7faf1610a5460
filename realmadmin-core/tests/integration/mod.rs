//! Integration test modules

mod directory;
mod session_flow_tests;
mod vault_file_tests;
