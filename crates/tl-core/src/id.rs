// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Newtype identifier wrappers.

/// Define a newtype ID wrapper around `String` with the usual accessors.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, and `Borrow<str>` implementations so the wrapper can be
/// used as a map key or compared against string literals in tests.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// The directory name of a task: `<vault>/<task-name>/`.
    ///
    /// Validated on construction via [`crate::validate_task_name`] at every
    /// boundary that accepts one from the filesystem or the event queue.
    pub struct TaskName;
}

define_id! {
    /// The name of a backend as it appears in `LLM_<NAME>_*` config keys
    /// and in lock/audit paths, e.g. `"claude"` or `"ollama"`.
    pub struct BackendName;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
