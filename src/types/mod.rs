mod datetime;
pub use datetime::*;

mod window;
pub use window::TimeWindow;
