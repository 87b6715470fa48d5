//! API Routes
//!
//! Route handlers organized by functionality.

pub mod assets;
pub mod health;
pub mod strip;
