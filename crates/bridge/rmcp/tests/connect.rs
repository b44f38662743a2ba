use mcp_bridge_core::DiscoveryOptions;
use mcp_bridge_rmcp::{ConnectOptions, RmcpSession, SessionError, TransportSpec, load_server};
use std::time::Duration;

fn quick() -> ConnectOptions {
    ConnectOptions::default().with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let spec = TransportSpec::detect("mcp-bridge-test-no-such-binary --flag").unwrap();
    let err = RmcpSession::connect(&spec, &quick()).await.unwrap_err();
    match err {
        SessionError::Spawn { command, .. } => {
            assert_eq!(command, "mcp-bridge-test-no-such-binary");
        }
        other => panic!("expected spawn error, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn server_that_exits_fails_the_handshake() {
    let spec = TransportSpec::detect("true").unwrap();
    let err = load_server(&spec, &quick(), &DiscoveryOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            SessionError::Handshake(_) | SessionError::HandshakeTimeout(_)
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn blocking_connect_inside_a_runtime_is_refused() {
    let spec = TransportSpec::detect("mcp-bridge-test-no-such-binary").unwrap();
    let err = RmcpSession::connect_blocking(&spec, &quick()).unwrap_err();
    assert!(matches!(err, SessionError::NestedRuntime));
}

#[test]
fn blocking_connect_reports_spawn_errors() {
    let spec = TransportSpec::detect("mcp-bridge-test-no-such-binary").unwrap();
    let err = RmcpSession::connect_blocking(&spec, &quick()).unwrap_err();
    assert!(matches!(err, SessionError::Spawn { .. }));
}
