//! Behavioral tests for the factory.
//!
//! These tests verify the factory's contract without a live node.

use crate::fixtures::{MockNode, TestEnv};
use tx_factory::tx::{validate_memo, AccountConfig, SignModeHandlerMap, SignerData};
use tx_factory::types::AddressCodec;
use tx_factory::{Coin, DecCoin, Msg, SignMode, TxError, TxParameters};

mod prepare_tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_with_from_address() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let address = env.codec.string_to_bytes(&env.address("alice")).unwrap();
        let mut params = TxParameters::new("demo");
        params.account = AccountConfig::from_address(address.clone());

        let mut factory = env.factory(params);
        factory.prepare().await.unwrap();
        assert_eq!(factory.params().account.from_address, address);
        assert_eq!(factory.account_number(), 1);
    }

    #[tokio::test]
    async fn test_prepare_with_empty_params_fails() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let mut factory = env.factory(TxParameters::default());
        let err = factory.prepare().await.unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(env.node.lookups(), 0);
    }

    #[tokio::test]
    async fn test_prepare_is_idempotent() {
        let env = TestEnv::new(MockNode::with_account(5, 8));
        let mut factory = env.factory(env.params()).with_sequence(100);

        factory.prepare().await.unwrap();
        factory.prepare().await.unwrap();
        assert_eq!(factory.sequence(), 8);
        assert_eq!(env.node.lookups(), 2);
    }

    #[tokio::test]
    async fn test_prepare_unknown_account() {
        let env = TestEnv::new(MockNode::default());
        let mut factory = env.factory(env.params());
        let err = factory.prepare().await.unwrap_err();
        assert!(err.is_network_error());
        assert!(!err.is_retryable());
    }
}

mod build_tests {
    use super::*;

    #[test]
    fn test_build_unsigned_tx_table() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();

        let cases: Vec<(&str, TxParameters, bool)> = vec![
            ("valid", env.params(), true),
            (
                "missing chain id",
                TxParameters {
                    chain_id: String::new(),
                    ..env.params()
                },
                false,
            ),
            ("fees and gas prices", {
                let mut params = env.params();
                params.fee.fees = Coin::parse_list("1000stake").unwrap();
                params.gas.gas_prices = DecCoin::parse_list("0.5stake").unwrap();
                params
            }, false),
            ("oversized memo", TxParameters {
                memo: "x".repeat(257),
                ..env.params()
            }, false),
        ];

        for (name, params, ok) in cases {
            let result = env.factory(params).build_unsigned_tx(&[&msg]);
            assert_eq!(result.is_ok(), ok, "case {name}");
            if let Ok(tx) = result {
                assert!(tx.signer_infos().is_none(), "case {name}");
                assert!(tx.signatures().is_none(), "case {name}");
            }
        }
    }

    #[test]
    fn test_fee_rounds_up() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let factory = env
            .factory(env.params())
            .with_gas(33_333)
            .with_gas_prices(DecCoin::parse_list("0.003stake").unwrap());

        let tx = factory.build_unsigned_tx(&[&msg]).unwrap();
        // 33_333 * 0.003 = 99.999
        assert_eq!(tx.fee_amount(), &[Coin::new(100, "stake").unwrap()]);
    }

    #[test]
    fn test_build_sim_tx() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let bytes = env.factory(env.params()).build_sim_tx(&[&msg]).unwrap();
        assert!(!bytes.is_empty());

        let err = env
            .factory(env.params())
            .with_chain_id("")
            .build_sim_tx(&[&msg])
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validate_memo() {
        assert!(validate_memo("").is_ok());
        assert!(validate_memo("11245").is_ok());
        assert!(validate_memo(&"x".repeat(257)).is_err());

        let seed_phrase = vec!["echo"; 15].join(" ");
        assert!(seed_phrase.len() < 256);
        assert!(validate_memo(&seed_phrase).is_err());
        assert!(validate_memo(&seed_phrase.to_uppercase()).is_err());

        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let factory = env.factory(env.params()).with_memo(seed_phrase);
        let err = factory.build_unsigned_tx(&[&msg]).unwrap_err();
        assert!(err.is_config_error());
    }
}

mod gas_tests {
    use super::*;

    #[tokio::test]
    async fn test_calculate_gas_offline() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let mut params = env.params();
        params.execution.offline = true;
        let msg = env.increase_counter();

        let err = env.factory(params).calculate_gas(&[&msg]).await.unwrap_err();
        assert!(matches!(err, TxError::Offline(_)));
        assert_eq!(env.node.simulations(), 0);
    }

    #[tokio::test]
    async fn test_calculate_gas_applies_adjustment() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let mut factory = env.factory(env.params()).with_gas_adjustment(1.2);

        factory.calculate_gas(&[&msg]).await.unwrap();
        // ceil(61_234 * 1.2) = ceil(73_480.8)
        assert_eq!(factory.gas(), 73_481);
    }

    #[tokio::test]
    async fn test_simulate() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let factory = env.factory(env.params());

        let (response, gas_used) = factory.simulate(&[&msg]).await.unwrap();
        assert!(response.result.is_some());
        assert!(gas_used > 0);
    }
}

mod sign_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_direct() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let mut factory = env.factory(env.params());
        factory.prepare().await.unwrap();

        let mut tx = factory.build_unsigned_tx(&[&msg]).unwrap();
        factory.sign(&mut tx, true).unwrap();
        assert_eq!(tx.signatures().unwrap().len(), 1);
        assert_eq!(tx.signer_infos().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_every_mode() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();

        for mode in SignMode::SUPPORTED {
            let mut factory = env.factory(env.params()).with_sign_mode(mode);
            factory.prepare().await.unwrap();
            let mut tx = factory.build_unsigned_tx(&[&msg]).unwrap();
            factory.sign(&mut tx, false).unwrap();
            assert!(tx.signers()[0].is_signed(), "mode {mode}");
        }
    }

    #[tokio::test]
    async fn test_amino_json_needs_amino_form() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let opaque = tx_factory::tx::AnyMsg::new(
            "/cosmos.counter.v1.MsgIncreaseCounter",
            vec![],
            vec![env.address("alice")],
        );
        let mut factory = env
            .factory(env.params())
            .with_sign_mode(SignMode::LegacyAminoJson);
        factory.prepare().await.unwrap();

        let mut tx = factory.build_unsigned_tx(&[&opaque]).unwrap();
        let err = factory.sign(&mut tx, false).unwrap_err();
        assert!(matches!(err, TxError::Encoding(_)));
        assert!(tx.signer_infos().is_none());
    }

    #[tokio::test]
    async fn test_get_sign_bytes() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        let factory = env.factory(env.params());
        let tx = factory.build_unsigned_tx(&[&msg]).unwrap();
        let data = SignerData {
            address: env.address("alice"),
            chain_id: "demo".into(),
            account_number: 1,
            sequence: 0,
            public_key: env.keyring_public_key_any(),
        };

        let direct = factory.get_sign_bytes(&data, &tx).unwrap();
        assert!(!direct.is_empty());
        assert_eq!(direct, factory.get_sign_bytes(&data, &tx).unwrap());

        let unspecified = factory.clone().with_sign_mode(SignMode::Unspecified);
        assert!(unspecified.get_sign_bytes(&data, &tx).is_err());

        let restricted = factory
            .with_sign_mode(SignMode::Textual)
            .with_sign_modes(SignModeHandlerMap::new([SignMode::Direct]));
        assert!(matches!(
            restricted.get_sign_bytes(&data, &tx),
            Err(TxError::UnsupportedSignMode(_))
        ));
    }

    #[test]
    fn test_msg_signers_are_addresses() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let msg = env.increase_counter();
        assert_eq!(msg.signers(), vec![env.address("alice")]);
    }
}

mod setter_tests {
    use super::*;

    #[test]
    fn test_with_setters() {
        let env = TestEnv::new(MockNode::with_account(1, 0));
        let factory = env.factory(env.params());

        let f = factory.clone().with_gas(1000);
        assert_eq!(f.gas(), 1000);
        assert_eq!(f.sequence(), factory.sequence());

        let f = factory.clone().with_sequence(10);
        assert_eq!(f.sequence(), 10);
        assert_eq!(f.gas(), factory.gas());

        let f = factory.clone().with_account_number(123);
        assert_eq!(f.account_number(), 123);
        assert_eq!(f.chain_id(), "demo");
    }
}
