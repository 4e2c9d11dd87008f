//! End-to-end tests: the full pipeline against a mocked REST gateway.

use crate::fixtures::{MockNode, MsgIncreaseCounter, TestEnv};
use k256::ecdsa::signature::Verifier;
use k256::ecdsa::{Signature, VerifyingKey};
use prost::Message;
use serde_json::json;
use std::sync::Arc;
use tx_factory::client::RestClient;
use tx_factory::config::{NodeConfig, TxConfig};
use tx_factory::keyring::Keystore;
use tx_factory::tx::proto::{AuthInfo, SignDoc, TxBody, TxRaw};
use tx_factory::{Coin, Factory, TxError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_account(server: &MockServer, address: &str, account_number: u64, sequence: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/cosmos/auth/v1beta1/accounts/{address}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account": {
                "@type": "/cosmos.auth.v1beta1.BaseAccount",
                "address": address,
                "pub_key": null,
                "account_number": account_number.to_string(),
                "sequence": sequence.to_string()
            }
        })))
        .mount(server)
        .await;
}

async fn mount_simulate(server: &MockServer, gas_used: u64) {
    Mock::given(method("POST"))
        .and(path("/cosmos/tx/v1beta1/simulate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gas_info": {"gas_wanted": "0", "gas_used": gas_used.to_string()},
            "result": {"data": "", "log": "", "events": [], "msg_responses": []}
        })))
        .mount(server)
        .await;
}

fn rest_factory(env: &TestEnv, server: &MockServer, config: &TxConfig) -> Factory {
    let node = Arc::new(RestClient::new(NodeConfig::custom(&server.uri()).unwrap().without_retry()).unwrap());
    let params = config.to_params(env.codec.as_ref()).unwrap();
    Factory::new(env.keyring.clone(), node.clone(), node, env.codec.clone(), params)
}

fn alice_config() -> TxConfig {
    TxConfig {
        from: "alice".into(),
        chain_id: "demo".into(),
        gas: "auto".into(),
        gas_adjustment: 1.0,
        gas_prices: "0.025uatom".into(),
        sign_mode: tx_factory::SignMode::Direct,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_increase_counter_end_to_end() {
    let env = TestEnv::new(MockNode::default());
    let server = MockServer::start().await;
    mount_account(&server, &env.address("alice"), 12, 3).await;
    mount_simulate(&server, 85_000).await;

    let mut factory = rest_factory(&env, &server, &alice_config());
    let msg = env.increase_counter();
    let tx = factory.build_signed_tx(&[&msg]).await.unwrap();

    assert_eq!(factory.gas(), 85_000);
    assert_eq!(tx.gas_limit(), 85_000);
    assert_eq!(tx.fee_amount(), &[Coin::new(2125, "uatom").unwrap()]);
    assert_eq!(tx.signatures().unwrap().len(), 1);

    let raw = TxRaw::decode(tx.encode().as_slice()).unwrap();
    let body = TxBody::decode(raw.body_bytes.as_slice()).unwrap();
    assert_eq!(body.messages.len(), 1);
    assert_eq!(
        MsgIncreaseCounter::decode(body.messages[0].value.as_slice()).unwrap(),
        msg
    );
    let auth = AuthInfo::decode(raw.auth_info_bytes.as_slice()).unwrap();
    assert_eq!(auth.signer_infos.len(), 1);
    assert_eq!(auth.signer_infos[0].sequence, 3);

    let sign_doc = SignDoc {
        body_bytes: raw.body_bytes.clone(),
        auth_info_bytes: raw.auth_info_bytes.clone(),
        chain_id: "demo".into(),
        account_number: 12,
    }
    .encode_to_vec();
    let public_key = env.keyring.public_key("alice").unwrap();
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key.as_bytes()).unwrap();
    let signature = Signature::from_slice(&raw.signatures[0]).unwrap();
    assert!(verifying_key.verify(&sign_doc, &signature).is_ok());
}

#[tokio::test]
async fn test_offline_generate_only_never_calls_node() {
    let env = TestEnv::new(MockNode::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = TxConfig {
        gas: "150000".into(),
        account_number: 4,
        sequence: 9,
        offline: true,
        generate_only: true,
        ..alice_config()
    };
    let mut factory = rest_factory(&env, &server, &config);
    let msg = env.increase_counter();
    let tx = factory.build_signed_tx(&[&msg]).await.unwrap();

    assert_eq!(tx.gas_limit(), 150_000);
    assert!(tx.signatures().is_none());
    assert_eq!(factory.sequence(), 9);

    // Signing afterwards still works with the configured account data.
    let mut tx = tx;
    factory.sign(&mut tx, false).unwrap();
    assert_eq!(tx.signer_infos().unwrap()[0].sequence, 9);
}

#[tokio::test]
async fn test_simulation_rejected_by_node() {
    let env = TestEnv::new(MockNode::default());
    let server = MockServer::start().await;
    mount_account(&server, &env.address("alice"), 12, 3).await;
    Mock::given(method("POST"))
        .and(path("/cosmos/tx/v1beta1/simulate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 2,
            "message": "failed to execute message; message index: 0: counter overflow",
            "details": []
        })))
        .mount(&server)
        .await;

    let mut factory = rest_factory(&env, &server, &alice_config());
    let msg = env.increase_counter();
    let err = factory.build_signed_tx(&[&msg]).await.unwrap_err();

    assert!(matches!(err, TxError::Simulation(_)));
    assert!(!err.is_retryable());
    assert_eq!(err.user_message(), "Transaction simulation failed");
    assert_eq!(factory.gas(), 0);
}

#[tokio::test]
async fn test_unknown_account() {
    let env = TestEnv::new(MockNode::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 5,
            "message": "account not found",
            "details": []
        })))
        .mount(&server)
        .await;

    let mut factory = rest_factory(&env, &server, &alice_config());
    let err = factory.prepare().await.unwrap_err();
    match err {
        TxError::AccountLookup { address, source } => {
            assert_eq!(address, env.address("alice"));
            assert!(source.is_not_found());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
