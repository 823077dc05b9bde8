pub mod line_parser;
pub mod line_serializer;

pub use line_parser::{parse_line, parse_lines};
pub use line_serializer::{serialize_line, serialize_tasks};
