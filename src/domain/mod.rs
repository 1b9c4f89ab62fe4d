// Domain layer - Preset model and overlay geometry

pub mod model;
