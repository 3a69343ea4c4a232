// ABOUTME: Renderer module wrapping the handlebars text-substitution engine
// ABOUTME: Exports the renderer, environment functions, built-in helpers, and safe sessions

pub mod engine;
pub mod error;
pub mod functions;
pub mod helpers;
pub mod session;

pub use engine::{Renderer, RESPONSE_VAR};
pub use error::{RenderError, Result};
pub use functions::{is_good_name, EnvFunction, FunctionBatch};
pub use session::SafeRenderer;
