//! Integration tests for the refresh pipeline

mod refresh_tests;
