pub mod config_tests;
pub mod discovery_tests;
pub mod extraction_tests;
