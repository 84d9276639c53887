//! Authenticated access to the BitSight ratings API with pagination

mod client;
mod error;
mod pager;
mod results;
mod transport;

pub use client::{basic_auth_header, ApiClient, RequestSettings, DEFAULT_BASE_URL, USER_AGENT};
pub use error::ApiError;
pub use pager::paginate;
pub use results::{next_link, results_of, RESULT_KEYS};
pub use transport::{HttpTransport, ProxySettings, Transport};
