mod error;
pub use error::ParserError;

mod line;
pub use line::{Line, LineReader};

mod field;
pub use field::FieldLine;

mod block;
pub use block::FeedParser;
