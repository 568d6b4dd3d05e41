//! Integration tests for pixelpuritan
//!
//! These tests exercise the client against mock and real servers and the
//! filesystem helpers against temporary directories.

pub mod client_tests;
pub mod end_to_end_tests;
pub mod report_tests;
pub mod scanner_tests;
pub mod splitter_tests;
