//! Environment bootstrap. These tests mutate process environment, so they
//! run serially.

use bank_core::config::{HOST_ENV, SCHEME_ENV};
use bank_core::{BankClient, BankService, ServiceConfig};
use serial_test::serial;

#[test]
#[serial]
fn service_reads_scheme_and_host_from_env() {
    std::env::set_var(SCHEME_ENV, "https");
    std::env::set_var(HOST_ENV, "bank.dottics.com");

    let service = BankService::from_env("my-test-token").unwrap();
    assert_eq!(service.base_url().scheme(), "https");
    assert_eq!(service.base_url().host_str(), Some("bank.dottics.com"));

    let req = service.build_get_tags();
    assert_eq!(req.url, "https://bank.dottics.com/tag");
    assert_eq!(req.header("authorization"), Some("Bearer my-test-token"));

    std::env::remove_var(SCHEME_ENV);
    std::env::remove_var(HOST_ENV);
}

#[test]
#[serial]
fn missing_env_falls_back_to_defaults() {
    std::env::remove_var(SCHEME_ENV);
    std::env::remove_var(HOST_ENV);

    let config = ServiceConfig::from_env("");
    assert_eq!(config, ServiceConfig::default());

    let client = BankClient::from_env("").unwrap();
    assert_eq!(client.service().base_url().as_str(), "http://localhost:5000/");
    assert!(client.service().build_get_tags().headers.is_empty());
}
