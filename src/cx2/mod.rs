// mod.rs - CX2 module root

pub mod network;
pub mod style;

// Re-export main types for convenience
pub use network::{infer_datatype, Cx2Edge, Cx2Network, Cx2Node};
pub use style::NestStyle;
