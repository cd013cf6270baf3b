mod list;

pub use list::{is_ignored, list_root_entries};
