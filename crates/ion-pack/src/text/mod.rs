//! The Ion 1.0 text form: tokenizer, pull reader, and canonical writer.

pub mod reader;
pub mod scanner;
pub mod writer;

pub use reader::TextReader;
pub use writer::TextWriter;
