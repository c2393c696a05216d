//! `init_tracing` installs the `RUST_LOG` filter once.
//!
//! Kept in its own binary: the subscriber it installs is process-global.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use nimble_fixtures::fixtures;
use nimble_proxy::{init_tracing, MethodProxy};
use tracing::Level;

#[test]
fn filter_comes_from_rust_log() {
    std::env::set_var("RUST_LOG", "nimble_thunk=debug");
    init_tracing();
    // A second call is a no-op rather than a double install.
    init_tracing();

    assert!(tracing::enabled!(target: "nimble_thunk", Level::DEBUG));
    assert!(!tracing::enabled!(target: "nimble_thunk", Level::TRACE));
    assert!(!tracing::enabled!(target: "nimble_emit", Level::DEBUG));

    let method = fixtures().sample.method("Method2").unwrap();
    assert!(MethodProxy::new(method).is_ok());
}
