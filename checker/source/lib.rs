mod path_order;
mod source_file;
mod span;

pub use path_order::{compare_paths, display_relative_to, path_to_key};
pub use source_file::{FileId, FileRole, SourceFile};
pub use span::{Position, Span};
