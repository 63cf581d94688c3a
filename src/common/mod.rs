//! Common, shared types.

pub mod bounds;
pub mod contact;
pub mod kinds;
pub mod layers;
pub mod listeners;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
