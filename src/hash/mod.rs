//! Hashing subsystem: bit mixers and pluggable hashing strategies
//!
//! - [`bit_mixer`]: avalanche functions conditioning raw hash codes before a
//!   table masks them into a slot index
//! - [`HashStrategy`] and its implementations: the hash/equality capability a
//!   table consumes instead of the key's own `Hash`/`Eq`

pub mod bit_mixer;
mod strategy;

pub use bit_mixer::{fold64, mix, mix32, mix64, mix_phi, perturbation, Mixer, PERTURBATIONS};
pub use strategy::{DefaultStrategy, HashStrategy, IdentityStrategy, MixedStrategy};
