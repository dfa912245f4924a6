//! Fault barriers.
//!
//! The hook must always produce output, so each stage of the pipeline runs
//! behind a barrier that turns a panic into a neutral value for that stage
//! alone. Requires `panic = "unwind"` in every profile.

use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Run `f`, returning `fallback()` if it panics.
pub fn isolate<T>(stage: &str, f: impl FnOnce() -> T, fallback: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            warn!(stage, reason = %panic_message(payload.as_ref()), "Stage faulted, using neutral value");
            fallback()
        }
    }
}

/// Like [`isolate`] but falls back to `T::default()`.
pub fn isolate_or_default<T: Default>(stage: &str, f: impl FnOnce() -> T) -> T {
    isolate(stage, f, T::default)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_normal_values() {
        assert_eq!(isolate("ok", || 5, || 0), 5);
    }

    #[test]
    fn panics_become_fallbacks() {
        let value: Vec<u8> = isolate_or_default("boom", || panic!("extractor exploded"));
        assert!(value.is_empty());
        assert_eq!(isolate("boom", || -> u32 { panic!("again") }, || 7), 7);
    }
}
