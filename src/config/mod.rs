pub mod types;
pub mod loader;
pub mod registry;
pub mod validator;

pub use types::*;
pub use loader::*;
pub use registry::*;
pub use validator::*;
