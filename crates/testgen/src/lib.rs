//! Synthetic CAS-register history generator, for exercising the checker
//! against both valid chains and deliberately invalid ones.

pub mod generator;
