mod event;
pub use event::{RawEvent, RawEventBuilder};
