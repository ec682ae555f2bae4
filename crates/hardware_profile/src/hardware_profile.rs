//! hardware_profile: Host resource snapshots, capability tiers, and backend selection.
//!
//! A [`ResourceSnapshot`] is gathered fresh from the OS on every call to
//! [`collect_snapshot`]; nothing is cached between runs so that attaching or
//! removing a GPU is picked up on the next decision cycle. Everything else in
//! this crate is a pure function of a snapshot.

mod backend;
mod collector;
pub mod probe;
mod snapshot;
mod tier;

pub use backend::{Backend, BackendPolicy, llama_cpp_cmake_args};
pub use collector::{CollectorOptions, HostFacts, assemble, collect_snapshot, gather_host_facts};
pub use snapshot::{MB_PER_GB, ResourceSnapshot};
pub use tier::{BALANCED_RAM_MB, ELITE_VRAM_MB, HIGH_VRAM_MB, Tier};
