// Domain layer: core models and ports (interfaces) for driving external tools and the operator.

pub mod model;
pub mod ports;
