//! HTTP plumbing: request building, transport, responses

pub mod request;
mod response;
mod transport;

pub use request::{build, PreparedRequest, RequestBody};
pub use response::HttpResponse;
pub use transport::{HttpTransport, Transport};
