//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::sync::{Arc, Mutex};

/// Shared log of operation names, appended to as operations run
pub type OperateLog = Arc<Mutex<Vec<String>>>;

pub fn operate_log() -> OperateLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
