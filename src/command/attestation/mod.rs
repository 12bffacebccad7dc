// src/command/attestation/mod.rs

pub mod extract;
pub mod flow;
pub mod notify;
pub mod ops;
pub mod params;
pub mod surface;
pub mod types;
pub mod validate;

pub use extract::*;
pub use flow::*;
pub use notify::*;
pub use ops::*;
pub use params::*;
pub use surface::*;
pub use types::*;
pub use validate::*;
