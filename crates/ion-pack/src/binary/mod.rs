//! The Ion 1.0 binary form: wire constants, field primitives, and the
//! pull reader / streaming writer pair.

pub mod constants;
pub mod primitives;
pub mod reader;
pub mod writer;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
