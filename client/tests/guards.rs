use client::{
    e2e_helpers::{
        E2e,
        InMemoryLedger,
        RejectingWallet,
    },
    error::ClientError,
    state::{
        CreateForm,
        StatusLevel,
    },
    submission::SubmissionState,
    transactions::SendTransactionConfig,
    wallet::{
        KeypairWallet,
        NOT_CONNECTED,
    },
};
use solana_address::Address;
use solana_keypair::Keypair;
use solana_sdk::{
    signature::Signature,
    signer::Signer,
};

/// Creates "Doge" with the harness wallet, then hands the session to a new wallet holding
/// `lamports`.
async fn doge_with_buyer(lamports: u64) -> E2e {
    let mut e2e = E2e::new().await;
    e2e.create_coin("Doge", "MOON").await.unwrap();

    let buyer = Keypair::new();
    e2e.ledger().airdrop(&buyer.pubkey(), lamports);
    e2e.session.wallet = KeypairWallet::connected(buyer);
    e2e.session.load().await;
    e2e
}

#[tokio::test]
async fn buy_needs_cost_plus_fee_reserve() {
    let mut e2e = doge_with_buyer(50_000_000).await;
    let sent = e2e.ledger().sent_transactions();

    let result = e2e.buy("Doge", 60).await;

    assert_eq!(
        result,
        Err(ClientError::InsufficientFunds {
            required: 70_000_000,
            available: 50_000_000,
        })
    );
    assert_eq!(e2e.balance(), 50_000_000);
    assert_eq!(e2e.ledger().sent_transactions(), sent);
    assert_eq!(e2e.holding("Doge"), None);

    let state = e2e.session.state();
    assert!(matches!(state.submission, Some(SubmissionState::Failed { .. })));
    assert_eq!(state.buy_form.quantity, "60");
    assert!(state.can_submit());
}

#[tokio::test]
async fn create_needs_the_minimum_reserve() {
    let mut e2e = E2e::funded(50_000_000).await;

    let result = e2e.create_coin("Doge", "MOON").await;

    assert_eq!(
        result,
        Err(ClientError::InsufficientFunds {
            required: 100_000_000,
            available: 50_000_000,
        })
    );
    assert!(e2e.ledger().record("Doge").is_none());
}

#[tokio::test]
async fn inactive_records_refuse_buys_and_sells() {
    let mut e2e = E2e::new().await;
    e2e.create_coin("Doge", "MOON").await.unwrap();
    e2e.buy("Doge", 5).await.unwrap();
    e2e.ledger().set_active("Doge", false);
    let before = e2e.balance();

    let inactive: Result<Signature, _> = Err(ClientError::InactiveRecord("Doge".into()));
    assert_eq!(e2e.buy("Doge", 1).await, inactive.clone());
    assert_eq!(e2e.sell("Doge", 1).await, inactive);

    assert_eq!(e2e.balance(), before);
    assert_eq!(e2e.holding("Doge"), Some(5));
}

#[tokio::test]
async fn cannot_sell_more_than_held() {
    let mut e2e = E2e::new().await;
    e2e.create_coin("Doge", "MOON").await.unwrap();
    e2e.buy("Doge", 3).await.unwrap();

    let result = e2e.sell("Doge", 5).await;

    assert_eq!(
        result,
        Err(ClientError::InsufficientBalance {
            requested: 5,
            held: 3,
        })
    );
    assert_eq!(e2e.holding("Doge"), Some(3));
    let status = e2e.session.state().status.clone().unwrap();
    assert_eq!(
        status.message,
        "❌ Error: Insufficient token balance: requested 5, holding 3"
    );
}

#[tokio::test]
async fn selling_without_a_holding_reports_zero_held() {
    let mut e2e = doge_with_buyer(1_000_000_000).await;
    assert_eq!(
        e2e.sell("Doge", 1).await,
        Err(ClientError::InsufficientBalance {
            requested: 1,
            held: 0,
        })
    );
}

#[tokio::test]
async fn unknown_record() {
    let mut e2e = E2e::new().await;
    assert_eq!(
        e2e.buy("  Nope ", 1).await,
        Err(ClientError::RecordNotFound("Nope".into()))
    );
}

#[tokio::test]
async fn duplicate_create_is_refused_before_signing() {
    let mut e2e = E2e::new().await;
    e2e.create_coin("Doge", "MOON").await.unwrap();
    let sent = e2e.ledger().sent_transactions();

    let result = e2e.create_coin("Doge", "WOOF").await;

    assert!(matches!(result, Err(ClientError::Validation(m)) if m.contains("already exists")));
    assert_eq!(e2e.ledger().sent_transactions(), sent);
}

#[tokio::test]
async fn overlong_name_fails_derivation() {
    let mut e2e = E2e::new().await;
    let result = e2e.create_coin(&"x".repeat(40), "LONG").await;
    assert!(matches!(result, Err(ClientError::AddressDerivation(_))));
}

#[tokio::test]
async fn rejected_signature_fails_the_submission() {
    let address = Address::new_from_array([7; 32]);
    let ledger = InMemoryLedger::new();
    ledger.airdrop(&address, 1_000_000_000);
    let mut e2e = E2e::with_parts(ledger, RejectingWallet { address }).await;
    let mut states = vec![];

    let form = CreateForm {
        name: "Doge".into(),
        symbol: "MOON".into(),
        uri: "https://example.com/doge.json".into(),
        ..Default::default()
    };
    let result = e2e.create_coin_with(form, &mut states).await;

    let rejected = ClientError::Wallet("User rejected the request".into());
    assert_eq!(result, Err(rejected.clone()));
    assert_eq!(
        states,
        vec![
            SubmissionState::Building,
            SubmissionState::AwaitingSignature,
            SubmissionState::Failed { error: rejected },
        ]
    );
    assert_eq!(e2e.ledger().sent_transactions(), 0);
    assert_eq!(e2e.ledger().lamports(&address), 1_000_000_000);
    assert_eq!(
        e2e.session.state().status.clone().unwrap().message,
        "❌ Error: User rejected the request"
    );
}

#[tokio::test]
async fn disconnected_wallet_cannot_submit() {
    let mut e2e = E2e::with_parts(InMemoryLedger::new(), KeypairWallet::disconnected()).await;
    assert!(!e2e.session.state().can_submit());

    let result = e2e.buy("Doge", 1).await;

    assert_eq!(result, Err(ClientError::Wallet(NOT_CONNECTED.into())));
    assert_eq!(
        e2e.session.state().status.clone().unwrap().message,
        NOT_CONNECTED
    );
    assert_eq!(e2e.ledger().sent_transactions(), 0);
}

#[tokio::test]
async fn program_errors_surface_verbatim() {
    let mut e2e = E2e::new().await;
    let form = CreateForm {
        name: "Tiny".into(),
        symbol: "TNY".into(),
        uri: "https://example.com/tiny.json".into(),
        initial_supply: "5".into(),
        price_per_token: "1000".into(),
        ..Default::default()
    };
    e2e.create_coin_with(form, &mut vec![]).await.unwrap();

    let result = e2e.buy("Tiny", 6).await;

    let Err(ClientError::OnChainExecution(message)) = result else {
        panic!("expected an on-chain failure, got {result:?}");
    };
    assert!(message.contains("custom program error: 0x1771"), "{message}");
    let status = e2e.session.state().status.clone().unwrap();
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.message.contains(&message));
    assert_eq!(e2e.ledger().record("Tiny").unwrap().circulating_supply, 0);
}

#[tokio::test]
async fn failed_refresh_keeps_loaded_data() {
    let mut e2e = E2e::new().await;
    e2e.create_coin("Doge", "MOON").await.unwrap();
    e2e.buy("Doge", 2).await.unwrap();
    let loaded = e2e.session.state().clone();

    e2e.ledger().set_offline(true);
    e2e.session.refresh().await;

    let state = e2e.session.state();
    assert_eq!(state.records, loaded.records);
    assert_eq!(state.holdings, loaded.holdings);
    assert_eq!(state.balance, loaded.balance);
    assert_eq!(state.status.clone().unwrap().level, StatusLevel::Error);
}

#[tokio::test]
async fn unconfirmed_submission_times_out() {
    let keypair = Keypair::new();
    let ledger = InMemoryLedger::new()
        .with_confirmation_delay(100)
        .with_config(SendTransactionConfig {
            poll_interval_ms: 0,
            max_polls: 3,
            debug_logs: false,
        });
    ledger.airdrop(&keypair.pubkey(), 1_000_000_000);
    let mut e2e = E2e::with_parts(ledger, KeypairWallet::connected(keypair)).await;
    let mut states = vec![];

    let form = CreateForm {
        name: "Slow".into(),
        symbol: "SLO".into(),
        uri: "https://example.com/slow.json".into(),
        ..Default::default()
    };
    let result = e2e.create_coin_with(form, &mut states).await;

    let Err(ClientError::Network(message)) = &result else {
        panic!("expected a timeout, got {result:?}");
    };
    assert!(message.contains("wasn't confirmed after 3 status checks"), "{message}");

    let names: Vec<_> = states.iter().map(SubmissionState::name).collect();
    assert_eq!(
        names,
        ["Building", "AwaitingSignature", "Submitted", "Confirming", "Failed"]
    );

    let state = e2e.session.state();
    assert!(state.can_submit());
    assert_eq!(state.create_form.name, "Slow");
    assert_eq!(
        state.status.clone().unwrap().message,
        format!("❌ Error: {message}")
    );
}

#[tokio::test]
async fn preflight_failure_is_reported_from_building() {
    let mut e2e = E2e::new().await;
    let mut states = vec![];
    let form = CreateForm {
        name: "Doge".into(),
        symbol: "MOON".into(),
        uri: "https://example.com/doge.json".into(),
        decimals: "nine".into(),
        ..Default::default()
    };

    let result = e2e.create_coin_with(form, &mut states).await;

    assert!(matches!(result, Err(ClientError::Validation(_))));
    let names: Vec<_> = states.iter().map(SubmissionState::name).collect();
    assert_eq!(names, ["Building", "Failed"]);
    assert_eq!(e2e.ledger().sent_transactions(), 0);
}
