//! Common test utilities for swrad.
//!
//! Synthetic granule builders and float assertions shared by the
//! integration tests.

#![allow(dead_code)]

pub mod assertions;
pub mod test_data;
