// tests/common/mod.rs
//! Common test utilities for the native bridge integration tests.

#![allow(dead_code, unused_imports)]

pub mod gestures;
pub mod mock_element;

pub use gestures::swipe_descriptor;
pub use mock_element::MockElement;
