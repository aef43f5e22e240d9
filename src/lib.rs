pub mod catalog;
pub mod decode;
pub mod encode;
pub mod log;
pub mod parser;
pub mod source;
pub mod syntax;

pub mod isa {
    pub mod ee; // MIPS R5900 Emotion Engine
}

pub use catalog::{Catalog, Category, InstructionDef, Register};
pub use decode::{decode, Decoded};
pub use encode::{EncodeError, Encoder};
pub use log::{LogLevel, Logger, MemoryLog, TracingLog};
pub use parser::{CompileError, Parser};
pub use source::{compile, CdsSource, Compilation};
