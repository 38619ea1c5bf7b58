//! HTTP transport layer for the Gemini chat client.

mod http;
mod error;
mod reqwest;
pub mod endpoints;
mod request;
mod response;
mod timeout;

pub use http::{ChunkedStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, StreamingResponse};
pub use error::TransportError;
pub use self::reqwest::ReqwestTransport;
pub use request::{RequestBuilder, API_KEY_HEADER, API_KEY_QUERY_PARAM};
pub use response::ResponseParser;
pub use timeout::with_idle_timeout;
