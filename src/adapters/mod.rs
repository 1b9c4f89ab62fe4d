// Adapters - Concrete implementations of external concerns

pub mod toml_config;
