use bytes::Bytes;

use slalink_codec::UsageReportCodec;
use slalink_core_types::{Address, BlockNumber, UsageReportEntry, Wei};
use slalink_crypto::{keccak256, Identity};
use slalink_ledger::contract::{args, manager, sla};
use slalink_ledger::{Call, EventRecord, LedgerError, LedgerGateway, Token};
use slalink_test::fixtures::{self, APP_CERT, CLIENT_DH_KEY, PROVIDER_DH_KEY, SERVER_CERT};
use slalink_test::{keys, MockLedger};

async fn submit(
    ledger: &MockLedger,
    signer: &Identity,
    call: Call,
) -> Result<slalink_ledger::TransactionReceipt, LedgerError> {
    ledger.submit_call(call.sign(signer).unwrap()).await
}

async fn last_event(ledger: &MockLedger, contract: Address, event: &str) -> EventRecord {
    ledger
        .events(contract, event, BlockNumber::ZERO)
        .await
        .unwrap()
        .pop()
        .unwrap()
}

/// Opens an SLA at a rate of 2 wei per unit with stakes of 1000 wei each.
async fn open_sla(ledger: &MockLedger) -> (Address, Identity, Identity) {
    let opened = fixtures::open_sla(ledger, Wei::new(2), Wei::new(1000)).await;
    (opened.sla, opened.client, opened.provider)
}

#[tokio::test]
async fn deployment_emits_service_deployed() {
    let ledger = MockLedger::new();
    let receipt = ledger.deploy_manager(&keys::deployer()).await;
    let mgr = receipt.contract_address.unwrap();

    assert_eq!(receipt.block_number, BlockNumber::new(1));
    assert_eq!(
        receipt.sender.to_string(),
        "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
    );

    let event = last_event(&ledger, mgr, manager::events::SERVICE_DEPLOYED).await;
    assert_eq!(event.block_number, receipt.block_number);
    assert_eq!(event.address_arg(args::SERVICE_ADDR).unwrap(), mgr);
}

#[tokio::test]
async fn every_call_mines_a_block() {
    let ledger = MockLedger::new();
    let (_, _, _) = open_sla(&ledger).await;

    // deploy + 2 registrations + proposal + acceptance
    assert_eq!(ledger.current_block().await, BlockNumber::new(5));
}

#[tokio::test]
async fn acceptance_receipt_names_the_created_sla() {
    let ledger = MockLedger::new();
    let (client, provider) = (keys::client(), keys::provider());
    let mgr = ledger
        .deploy_manager(&keys::deployer())
        .await
        .contract_address
        .unwrap();

    let calls = [
        (
            &client,
            Call::new(mgr, manager::REGISTER_CLIENT)
                .arg(CLIENT_DH_KEY.0)
                .arg(CLIENT_DH_KEY.1),
        ),
        (
            &provider,
            Call::new(mgr, manager::REGISTER_PROVIDER)
                .arg(Wei::new(2))
                .arg(PROVIDER_DH_KEY.0)
                .arg(PROVIDER_DH_KEY.1)
                .arg(Bytes::from_static(SERVER_CERT))
                .arg(Bytes::from_static(APP_CERT)),
        ),
        (
            &client,
            Call::new(mgr, manager::PROPOSE_CONTRACT)
                .arg(keccak256(APP_CERT))
                .value(Wei::new(1000)),
        ),
    ];

    for (signer, call) in calls {
        let receipt = submit(&ledger, signer, call).await.unwrap();
        assert_eq!(receipt.contract_address, None);
    }

    let receipt = submit(
        &ledger,
        &provider,
        Call::new(mgr, manager::ACCEPT_PROPOSAL)
            .arg(0u64)
            .arg(Bytes::from_static(b"message"))
            .value(Wei::new(1000)),
    )
    .await
    .unwrap();

    let accepted = last_event(&ledger, mgr, manager::events::SLA_PROPOSAL_ACCEPTED).await;
    let sla_addr = accepted.address_arg(args::SLA_ADDR).unwrap();

    assert_eq!(receipt.contract_address, Some(sla_addr));
    assert_eq!(
        ledger_view(&ledger, sla_addr, sla::GET_CHECKPOINT_SEQ_NUM).await,
        0
    );
}

#[tokio::test]
async fn proposal_carries_client_key_and_hardware_id() {
    let ledger = MockLedger::new();
    let (_, client, _) = open_sla(&ledger).await;

    let mgr = ledger.event_log().await[0].address;
    let proposal = last_event(&ledger, mgr, manager::events::SLA_PROPOSAL).await;

    assert_eq!(proposal.address_arg(args::CLIENT).unwrap(), client.address());
    assert_eq!(proposal.u64(args::CONTRACT_ID).unwrap(), 0);
    assert_eq!(
        proposal.fixed_bytes(args::HARDWARE_ID).unwrap(),
        &keccak256(APP_CERT)
    );
    assert_eq!(proposal.fixed_bytes(args::CLT_DH_KEY_X).unwrap(), &CLIENT_DH_KEY.0);
    assert_eq!(proposal.fixed_bytes(args::CLT_DH_KEY_Y).unwrap(), &CLIENT_DH_KEY.1);
}

#[tokio::test]
async fn checkpoint_charges_client_and_advances_sequence() {
    let ledger = MockLedger::new();
    let (sla_addr, _, provider) = open_sla(&ledger).await;

    let report = UsageReportCodec.encode_entries(&[
        UsageReportEntry::new(10, 1),
        UsageReportEntry::new(0, 0),
        UsageReportEntry::new(5, 1),
    ]);

    submit(
        &ledger,
        &provider,
        Call::new(sla_addr, sla::HOST_CHECKPOINT_REPORT)
            .arg(0u64)
            .arg(3u64)
            .arg(report),
    )
    .await
    .unwrap();

    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_CHECKPOINT_SEQ_NUM).await, 1);
    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_CLIENT_BALANCE).await, 1000 - 30);
    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_PROVIDER_BALANCE).await, 1000 + 30);
}

async fn ledger_view(ledger: &MockLedger, contract: Address, function: &str) -> u128 {
    ledger
        .read_view(contract, function, &[])
        .await
        .and_then(|token: Token| token.as_uint())
        .unwrap()
}

#[tokio::test]
async fn client_balance_never_goes_negative() {
    let ledger = MockLedger::new();
    let (sla_addr, _, provider) = open_sla(&ledger).await;

    let report = UsageReportCodec.encode_entries(&[UsageReportEntry::new(u64::MAX, 1)]);

    submit(
        &ledger,
        &provider,
        Call::new(sla_addr, sla::HOST_CHECKPOINT_REPORT)
            .arg(0u64)
            .arg(1u64)
            .arg(report),
    )
    .await
    .unwrap();

    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_CLIENT_BALANCE).await, 0);
    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_PROVIDER_BALANCE).await, 2000);
}

#[tokio::test]
async fn out_of_order_checkpoint_reverts() {
    let ledger = MockLedger::new();
    let (sla_addr, _, provider) = open_sla(&ledger).await;

    let err = submit(
        &ledger,
        &provider,
        Call::new(sla_addr, sla::HOST_CHECKPOINT_REPORT)
            .arg(1u64)
            .arg(0u64)
            .arg(Bytes::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::SubmissionRejected { .. }));
    assert_eq!(ledger_view(&ledger, sla_addr, sla::GET_CHECKPOINT_SEQ_NUM).await, 0);
}

#[tokio::test]
async fn only_the_provider_may_report() {
    let ledger = MockLedger::new();
    let (sla_addr, client, _) = open_sla(&ledger).await;

    let err = submit(
        &ledger,
        &client,
        Call::new(sla_addr, sla::HOST_CHECKPOINT_REPORT)
            .arg(0u64)
            .arg(0u64)
            .arg(Bytes::new()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::SubmissionRejected { .. }));
}

#[tokio::test]
async fn malformed_report_reverts() {
    let ledger = MockLedger::new();
    let (sla_addr, _, provider) = open_sla(&ledger).await;

    let err = submit(
        &ledger,
        &provider,
        Call::new(sla_addr, sla::HOST_CHECKPOINT_REPORT)
            .arg(0u64)
            .arg(2u64)
            .arg(Bytes::from(vec![0u8; 12])),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::SubmissionRejected { .. }));
}

#[tokio::test]
async fn reverted_calls_leave_no_trace() {
    let ledger = MockLedger::new();
    let receipt = ledger.deploy_manager(&keys::deployer()).await;
    let mgr = receipt.contract_address.unwrap();

    let err = submit(
        &ledger,
        &keys::client(),
        Call::new(mgr, manager::PROPOSE_CONTRACT)
            .arg([0u8; 32])
            .value(Wei::new(1)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::SubmissionRejected { .. }));
    assert_eq!(ledger.current_block().await, receipt.block_number);
    assert_eq!(ledger.event_log().await.len(), 1);
}

#[tokio::test]
async fn unknown_contract_and_function() {
    let ledger = MockLedger::new();
    let receipt = ledger.deploy_manager(&keys::deployer()).await;
    let mgr = receipt.contract_address.unwrap();

    let err = submit(&ledger, &keys::client(), Call::new(Address::new([9; 20]), "f"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownContract(_)));

    let err = submit(&ledger, &keys::client(), Call::new(mgr, "selfDestruct"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownFunction(_)));
}

#[tokio::test]
async fn injected_read_failures_are_transient() {
    let ledger = MockLedger::new();
    let receipt = ledger.deploy_manager(&keys::deployer()).await;
    let mgr = receipt.contract_address.unwrap();

    ledger.fail_next_reads(1);

    let err = ledger
        .events(mgr, manager::events::SERVICE_DEPLOYED, BlockNumber::ZERO)
        .await
        .unwrap_err();
    assert!(err.is_transient());

    let events = ledger
        .events(mgr, manager::events::SERVICE_DEPLOYED, BlockNumber::ZERO)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn injected_events_get_a_fresh_block() {
    let ledger = MockLedger::new();
    let record = EventRecord::new(BlockNumber::new(999), Address::new([1; 20]), "Anything");

    let block = ledger.emit_event(record).await;
    assert_eq!(block, BlockNumber::new(1));
    assert_eq!(ledger.event_log().await[0].block_number, block);
}
