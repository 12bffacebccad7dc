// src/command/mod.rs

pub mod attestation;

pub use attestation::{AttestationForm, FragmentParams};
