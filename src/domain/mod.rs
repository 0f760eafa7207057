pub mod document;
pub mod extraction;
pub mod extraction_request;
pub mod site_rule;

pub use document::*;
pub use extraction::*;
pub use extraction_request::*;
pub use site_rule::*;
