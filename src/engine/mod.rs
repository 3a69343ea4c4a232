// ABOUTME: Execution engine module for tapestry templates
// ABOUTME: Handles template resolution, HTTP steps, and sequential step execution

pub mod error;
pub mod executor;
pub mod http;
pub mod resolver;

pub use error::{BoxError, ExecutionError, Result};
pub use executor::{parse_bool, Execution, Executor};
pub use http::{build_request, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use resolver::Resolver;
