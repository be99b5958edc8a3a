//! Integration tests for uhppoted-release
//!
//! Each test builds a throwaway workspace of real git repositories (every one with
//! a bare `origin`) and drives the compiled binary against it.

mod helpers;
mod test_pipeline;
mod test_status;
