//! Request construction and response handling
//!
//! Search URLs are assembled here from an endpoint, the API key and the
//! rendered query; sending goes through the retrying executor of the
//! transport crate.

pub use request::SearchRequest;
pub use response::SearchResponse;

mod request;
mod response;

// Re-export request types from the transport crate for convenience
pub use ramona_transport::{CancellationToken, HttpRequest};
