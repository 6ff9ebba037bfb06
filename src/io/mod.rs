//! Position-tracked little-endian byte I/O (spec layer L1).

mod reader;
mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;
