//! Infrastructure layer: durable client profile storage.

pub mod profile;

pub use profile::{Profile, ProfileStore};
