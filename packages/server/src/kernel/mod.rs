//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{SeoulOpenApiAdapter, ServerDeps};
pub use test_dependencies::{toilet_row, toilet_rows, MockPageSource};
pub use traits::BasePageSource;
