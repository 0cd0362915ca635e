//! Test modules for the subscriber map
