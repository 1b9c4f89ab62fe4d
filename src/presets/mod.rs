//! Presets: built-in definitions and the file loader

pub mod defaults;
pub mod loader;

pub use defaults::{builtin_preset, is_builtin, BUILTIN_PRESET_NAMES};
pub use loader::{save_preset, LoadedPreset, PresetListing, PresetLoader, PresetSource};
