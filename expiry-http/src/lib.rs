pub mod body;
pub mod freshness;
pub mod headers;
mod request;
mod response;

pub use body::ExpiryBody;
pub use freshness::is_fresh;
pub use headers::HeaderPolicy;
pub use request::{OriginalUri, rewrite_uri};
pub use response::{not_modified, snapshot_response};
