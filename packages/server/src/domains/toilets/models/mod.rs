pub mod page;
pub mod toilet;

pub use page::*;
pub use toilet::*;
