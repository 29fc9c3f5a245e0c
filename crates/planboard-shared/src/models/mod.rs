mod analytics;
mod member;
mod project;
mod task;
mod workspace;

pub use analytics::*;
pub use member::*;
pub use project::*;
pub use task::*;
pub use workspace::*;
