//! Integration tests for the OME-XML object model.
//!
//! These tests verify end-to-end functionality including:
//! - Building documents with every supported element
//! - Deferred reference resolution (forward references, dangling IDs, kind checks)
//! - Strict and lenient resolution policies
//! - Copy-conversion and serialization round trips
//! - Reading documents from disk and summarizing them

mod integration {
    pub mod test_utils;

    pub mod copy_tests;
    pub mod file_tests;
    pub mod parse_tests;
    pub mod resolution_tests;
}
