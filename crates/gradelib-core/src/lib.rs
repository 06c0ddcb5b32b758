//! Shared foundation for the gradelib workspace: the credential bundle,
//! the clone-state data model and concurrent progress registry, the
//! error taxonomy, and the one-shot async-runtime gate.
//!
//! Downstream crates (`gradelib-git`, `gradelib-github`, `gradelib-manager`)
//! depend on this crate but never on each other except through the
//! manager, the same layering the reference workspace uses for
//! `gh-client` sitting underneath the TUI crates.

pub mod config;
pub mod error;
pub mod repository;
pub mod runtime;

pub use config::Credentials;
pub use error::{GradelibError, Result};
pub use repository::{CloneState, CloneTaskView, ProgressRegistry, RepositoryRef};
pub use runtime::{ensure_initialized, setup_async};
