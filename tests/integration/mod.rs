//! Integration tests for verity
//!
//! These exercise the controller, report generator and report storage
//! together against a real directory tree.

mod controller_flow;
mod helpers;
mod history;
mod storage_lifecycle;
