//! Layered rate-limiting policy
//!
//! A fixed-order set of independent gating rules evaluated before a code is
//! issued or a verification attempt is accepted. All rules are pure reads;
//! the first failure aborts the request with a classified error.

mod policy;


pub use policy::{Gate, SubmitGate, ThrottlePolicy};
