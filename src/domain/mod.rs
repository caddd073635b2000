// Domain layer: loan data models and ports (interfaces).

pub mod model;
pub mod ports;
