//! Individual scoring factors.

pub mod challenge;
pub mod decay;
