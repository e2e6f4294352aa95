pub mod builder;

pub use builder::{build, preview_url, ResolvedRequest};
