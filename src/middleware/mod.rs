pub mod route_gate;

pub use route_gate::{gate_decision, route_gate, GateDecision};
