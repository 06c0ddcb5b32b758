//! Process-wide async runtime gate.
//!
//! Mirrors the `setup_async()` primitive the embedding Python wrapper
//! expects: a one-time call that must happen before any manager operation
//! runs. Realized as a `OnceLock` flag rather than anything that actually
//! spins up a Tokio runtime itself — this crate is a library, it does not
//! own the caller's executor, it only enforces that *something* called
//! `setup_async()` first.

use std::sync::OnceLock;

use crate::error::GradelibError;

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Marks the runtime as initialized. Idempotent: calling it more than once
/// has no effect beyond the first call.
pub fn setup_async() {
    INITIALIZED.get_or_init(|| {
        log::debug!("gradelib runtime initialized");
    });
}

/// Returns an error unless [`setup_async`] has already run.
pub fn ensure_initialized() -> Result<(), GradelibError> {
    if INITIALIZED.get().is_some() {
        Ok(())
    } else {
        Err(GradelibError::programmer(
            "setup_async() must be called before any gradelib operation",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_async_is_idempotent() {
        // INITIALIZED is process-global, so this only asserts that a
        // second call doesn't panic or reset anything; the pre-init
        // Err(Programmer(_)) path can't be exercised once any test in
        // this binary has called setup_async().
        setup_async();
        setup_async();
        assert!(ensure_initialized().is_ok());
    }
}
