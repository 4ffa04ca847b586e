use std::sync::Arc;
use std::time::Duration;

use eyre::{ensure, WrapErr};
use tracing::{info, info_span, Instrument};

use slalink_checkpoint::{CheckpointSubmitter, UsageSource};
use slalink_config::Config;
use slalink_core_types::{Address, BlockNumber, CheckpointState};
use slalink_crypto::Identity;
use slalink_handshake::client::{self, ClientParams};
use slalink_handshake::provider::{self, ProviderParams};
use slalink_handshake::{run_client_handshake, run_provider_handshake};
use slalink_ledger::{EventPoller, LedgerGateway};

use crate::Certificates;

/// Where the manager contract lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub manager: Address,
    /// Block in which the manager was deployed.
    pub deploy_block: BlockNumber,
}

/// Runs the client handshake, giving up after the configured timeout.
pub async fn run_client<L>(
    ledger: &L,
    identity: Arc<Identity>,
    deployment: Deployment,
    config: &Config,
) -> eyre::Result<client::SessionEstablished>
where
    L: LedgerGateway + ?Sized,
{
    let params = ClientParams::new(deployment.manager, deployment.deploy_block)
        .with_config(&config.handshake)
        .with_poller(EventPoller::new(config.ledger));

    let deadline = config.handshake.timeout;
    let session = tokio::time::timeout(deadline, run_client_handshake(ledger, identity, params))
        .await
        .wrap_err_with(|| timed_out("Client", deadline))??;

    Ok(session)
}

/// Runs the provider handshake, giving up after the configured timeout.
pub async fn run_provider<L>(
    ledger: &L,
    identity: Arc<Identity>,
    manager: Address,
    certificates: Certificates,
    config: &Config,
) -> eyre::Result<provider::SessionEstablished>
where
    L: LedgerGateway + ?Sized,
{
    let params = ProviderParams::new(manager)
        .with_config(&config.provider, &config.handshake)
        .with_certificates(certificates.server, certificates.app)
        .with_poller(EventPoller::new(config.ledger));

    let deadline = config.handshake.timeout;
    let session =
        tokio::time::timeout(deadline, run_provider_handshake(ledger, identity, params))
            .await
            .wrap_err_with(|| timed_out("Provider", deadline))??;

    Ok(session)
}

fn timed_out(role: &str, deadline: Duration) -> String {
    format!("{role} handshake did not complete within {deadline:?}")
}

/// The identities of both roles, when one process plays both.
#[derive(Clone, Debug)]
pub struct Roles {
    pub client: Arc<Identity>,
    pub provider: Arc<Identity>,
}

/// Both ends of one established SLA.
#[derive(Debug)]
pub struct EstablishedSession {
    pub client: client::SessionEstablished,
    pub provider: provider::SessionEstablished,
}

/// Runs the client and the provider as concurrent tasks that only meet
/// through the ledger, and waits for both.
pub async fn run_session<L>(
    ledger: Arc<L>,
    deployment: Deployment,
    roles: Roles,
    certificates: Certificates,
    config: &Config,
) -> eyre::Result<EstablishedSession>
where
    L: LedgerGateway + 'static,
{
    let Roles {
        client: client_identity,
        provider: provider_identity,
    } = roles;

    let provider_task = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        let config = config.clone();

        async move {
            run_provider(&*ledger, provider_identity, deployment.manager, certificates, &config).await
        }
        .instrument(info_span!("provider"))
    });

    let client_task = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        let config = config.clone();

        async move { run_client(&*ledger, client_identity, deployment, &config).await }
            .instrument(info_span!("client"))
    });

    let (client, provider) = tokio::join!(client_task, provider_task);
    let client = client.wrap_err("Client task failed")??;
    let provider = provider.wrap_err("Provider task failed")??;

    ensure!(
        client.record == provider.record,
        "Client and provider disagree on the SLA: {:?} vs {:?}",
        client.record,
        provider.record
    );

    info!(
        contract_id = %client.record.contract_id,
        sla = %client.sla_address,
        host = %client.payload,
        "Session established"
    );

    Ok(EstablishedSession { client, provider })
}

/// Submits `rounds` reports of `config.checkpoint.batch_size` requests
/// each, drawn from `source`. Stops at the first failure.
pub async fn run_checkpoints<L, S>(
    ledger: &L,
    submitter: &mut CheckpointSubmitter,
    source: &mut S,
    rounds: usize,
    config: &Config,
) -> eyre::Result<CheckpointState>
where
    L: LedgerGateway + ?Sized,
    S: UsageSource + ?Sized,
{
    let batch_size = config.checkpoint.batch_size;

    for round in 0..rounds {
        submitter
            .submit_from(ledger, source, batch_size)
            .await
            .wrap_err_with(|| format!("Checkpoint round {round} failed"))?;
    }

    Ok(*submitter.state())
}
