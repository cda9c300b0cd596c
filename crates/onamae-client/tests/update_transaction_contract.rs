//! Contract: the happy-path transaction and its input gate
//!
//! A successful update sends exactly LOGIN, MODIP, LOGOUT in that order on
//! one connection, and invalid inputs are rejected before any connection
//! is opened.

mod common;

use common::{ConnectScript, ScriptedConnector, test_config};
use onamae_client::{DdnsClient, Error};
use std::net::IpAddr;
use std::sync::atomic::Ordering;

fn addr() -> IpAddr {
    IpAddr::from([203, 0, 113, 7])
}

#[tokio::test]
async fn successful_update_sends_three_commands_in_order() {
    let (connector, log, connects) = ScriptedConnector::single(ConnectScript::Accept(vec![]));
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    client.update("www", "example.jp", addr()).await.unwrap();

    assert_eq!(log.sent_commands(), vec!["LOGIN", "MODIP", "LOGOUT"]);
    assert_eq!(connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_update_runs_on_its_own_connection() {
    let (connector, log, connects) = ScriptedConnector::new(vec![
        ConnectScript::Accept(vec![]),
        ConnectScript::Accept(vec![]),
    ]);
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    client.update("www", "example.jp", addr()).await.unwrap();
    client.update("mail", "example.jp", addr()).await.unwrap();

    assert_eq!(connects.load(Ordering::SeqCst), 2);
    assert_eq!(
        log.sent_commands(),
        vec!["LOGIN", "MODIP", "LOGOUT", "LOGIN", "MODIP", "LOGOUT"]
    );
}

#[tokio::test]
async fn ipv6_address_is_an_input_error_and_never_connects() {
    let (connector, log, connects) = ScriptedConnector::single(ConnectScript::Accept(vec![]));
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    let v6: IpAddr = "2001:db8::1".parse().unwrap();
    let err = client.update("www", "example.jp", v6).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
    assert!(log.sent_commands().is_empty());
}

#[tokio::test]
async fn empty_host_name_is_an_input_error_and_never_connects() {
    let (connector, _log, connects) = ScriptedConnector::single(ConnectScript::Accept(vec![]));
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    let err = client.update("", "example.jp", addr()).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_domain_name_is_an_input_error_and_never_connects() {
    let (connector, _log, connects) = ScriptedConnector::single(ConnectScript::Accept(vec![]));
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    let err = client.update("www", "", addr()).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn host_name_with_line_break_is_an_input_error_and_never_connects() {
    let (connector, _log, connects) = ScriptedConnector::single(ConnectScript::Accept(vec![]));
    let client = DdnsClient::with_connector(test_config(), Box::new(connector)).unwrap();

    // A crafted value that would smuggle a bare-dot line into the block.
    let err = client
        .update("www\n.\nMODIP", "example.jp", addr())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}
