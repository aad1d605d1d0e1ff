// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth)

pub mod public;
pub mod protected;
