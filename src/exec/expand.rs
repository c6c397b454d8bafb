// src/exec/expand.rs

//! Command line preparation: environment expansion and argument splitting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([^}]*)\}|([A-Za-z_][A-Za-z0-9_]*))").expect("env reference regex")
});

/// Expand `$VAR` and `${VAR}` against the current process environment.
///
/// Unset variables expand to the empty string; a `$` not followed by a
/// variable name is kept as-is.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Same as [`expand_env`] with a caller-supplied variable lookup.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REF
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}

/// Split a command line into program + arguments on plain whitespace.
///
/// There is no quoting or escaping: `echo "a b"` yields `["echo", "\"a", "b\""]`.
pub fn split_command(cmdline: &str) -> Vec<String> {
    cmdline.split_whitespace().map(str::to_string).collect()
}
