//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in g500-core, built on the `embedded-hal` 1.0 traits so they work with
//! any HAL:
//!
//! - Motor drivers (H-bridge with PWM enable)

#![no_std]
#![deny(unsafe_code)]

pub mod motor;
