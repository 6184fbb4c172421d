//! Portal Core - Scene parameters, configuration, and engine-free logic
//!
//! This crate provides the pieces of the portal scene that do not depend on
//! the rendering engine:
//! - Hex colors and the live-editable parameter set
//! - Firefly generation and the math mirrored by the firefly shader
//! - Resolution of named model nodes to material roles
//! - The one-shot soundtrack gate
//! - Viewport math and TOML configuration

pub mod assembly;
pub mod audio;
pub mod color;
pub mod config;
pub mod fireflies;
pub mod params;
pub mod viewport;

pub use assembly::{resolve_nodes, AssemblyError, MaterialSlot, NodeBindings, NodeRole};
pub use audio::{AudioGate, AudioState};
pub use color::{ColorError, HexColor};
pub use config::{load_config, ConfigError, PortalConfig};
pub use fireflies::{FireflyField, FireflyVolume};
pub use params::{ParameterChange, ParameterSet};
pub use viewport::Viewport;
