pub mod dump;
pub mod memory;
pub mod ops;
pub mod register;
pub mod stack;
pub mod value;
pub mod vm;

pub use register::RegisterFile;
pub use value::Value;
pub use vm::VirtualMachine;
