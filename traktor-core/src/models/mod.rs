//! Domain models for `Traktor`.
//!
//! ## Submodules
//!
//! - [`provider`] - Provider kinds (Trakt, TMDB, TVDB)

pub mod provider;

pub use provider::ProviderKind;
