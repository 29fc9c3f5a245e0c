mod envelope;
mod identity;
mod members;
mod projects;
mod tasks;
mod workspaces;

pub use envelope::*;
pub use identity::*;
pub use members::*;
pub use projects::*;
pub use tasks::*;
pub use workspaces::*;
