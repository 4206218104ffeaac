//! Core contracts for Lockbox: the text-oriented backing store the credential
//! layer writes ciphertext through.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod backing;
