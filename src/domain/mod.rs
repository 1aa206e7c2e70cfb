// Domain layer: per-request models and ports (interfaces).

pub mod model;
pub mod ports;
