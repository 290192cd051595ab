//! Tweaker Config
//!
//! Configuration model for the Electrix Tweaker control surface: a validated
//! registry of every control, topology-aware propagation between related controls,
//! the MIDI dump protocol, and a strict document format for saving and loading.

pub mod addressing;
pub mod cli;
pub mod config;
pub mod controls;
pub mod error;
pub mod midi;
pub mod paths;
pub mod persistence;
pub mod propagation;
pub mod registry;
pub mod topology;
pub mod transport;
pub mod wire;

pub use addressing::AddressingPolicy;
pub use error::{Error, Result};
pub use registry::{Registry, SyncState};
pub use transport::{MidiTransport, MidirTransport};
pub use wire::DumpOptions;
