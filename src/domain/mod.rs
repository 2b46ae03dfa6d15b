// Domain layer: location/agency models and the ports the resolver depends on.

pub mod model;
pub mod ports;
