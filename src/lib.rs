// ABOUTME: Main library module for the tapestry workflow engine
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod decode;
pub mod engine;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use decode::{Decoder, FileDecoder, TemplateStore};
pub use engine::{Execution, ExecutionError, Executor, HttpTransport, Resolver};
pub use model::{Env, Identity, Step, Template, Version};
pub use render::{Renderer, SafeRenderer};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
