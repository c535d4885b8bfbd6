// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging setup for Agora binaries.
//!
//! Library crates never construct a subscriber themselves; they log through
//! the global `tracing` dispatcher via the ordinary `tracing::{info, warn,
//! error, debug, trace}` macros. This module only provides the one piece
//! that is genuinely shared: the node binary's subscriber initialization,
//! configured from `node.logging` entries (see `agora-node::config`).

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber.
///
/// `directives` takes precedence over the `RUST_LOG` environment variable
/// when non-empty; this lets `logging[]` config entries override the
/// environment the way the original YAML-configured loggers did.
pub fn init(directives: &str) {
    let filter = if directives.is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(directives)
    };

    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic_when_called_twice() {
        init("info");
        init("debug");
    }
}
