pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{disassemble, AnalysisContext, Disassembly, Function, Row};
pub use model::Image;
