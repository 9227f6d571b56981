//! Skips wiremock-backed tests where loopback sockets cannot be bound.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

/// Environment switch that turns a local skip into a hard failure (CI).
const REQUIRE_SOCKETS_VAR: &str = "HEAN_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_VAR)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock server, or returns `None` after logging why the calling
/// test is skipped.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl Future<Output = Option<MockServer>> {
    let caller = Location::caller();
    async move {
        if TcpListener::bind("127.0.0.1:0").is_ok() {
            return Some(MockServer::start().await);
        }
        let message = format!(
            "[socket-bound-test] cannot bind a loopback socket for {}:{}",
            caller.file(),
            caller.line()
        );
        assert!(!sockets_required(), "{message}; unset {REQUIRE_SOCKETS_VAR} to allow skipping");
        eprintln!("{message}; skipping. Set {REQUIRE_SOCKETS_VAR}=1 to fail instead.");
        None
    }
}
