use std::sync::Arc;

use tracing::{info, warn};

use slalink_crypto::Identity;
use slalink_ledger::LedgerGateway;

use crate::{client, provider, Aborted};

/// Runs the client side of the handshake to completion.
///
/// Never times out by itself: wrap the future in a timeout to impose a
/// deadline. Dropping it discards the ephemeral key material.
pub async fn run_client_handshake<L>(
    ledger: &L,
    identity: Arc<Identity>,
    params: client::ClientParams,
) -> Result<client::SessionEstablished, Aborted>
where
    L: LedgerGateway + ?Sized,
{
    let result = async {
        let registered = client::Unstarted::new(identity, params)
            .register(ledger)
            .await?;

        let observed = registered.await_provider(ledger).await?;
        let proposed = observed.propose(ledger).await?;
        let accepted = proposed.await_acceptance(ledger).await?;

        accepted.open_session()
    }
    .await;

    match &result {
        Ok(session) => info!(
            contract_id = %session.record.contract_id,
            sla = %session.sla_address,
            provider = %session.payload,
            "Client session established"
        ),
        Err(aborted) => warn!(stage = %aborted.stage, "Client handshake aborted: {}", aborted.error),
    }

    result
}

/// Runs the provider side of the handshake to completion.
///
/// Same cancellation rules as [`run_client_handshake`].
pub async fn run_provider_handshake<L>(
    ledger: &L,
    identity: Arc<Identity>,
    params: provider::ProviderParams,
) -> Result<provider::SessionEstablished, Aborted>
where
    L: LedgerGateway + ?Sized,
{
    let result = async {
        let registered = provider::Unstarted::new(identity, params)
            .register(ledger)
            .await?;

        let observed = registered.await_proposal(ledger).await?;
        let accepted = observed.accept(ledger).await?;

        accepted.await_confirmation(ledger).await
    }
    .await;

    match &result {
        Ok(session) => info!(
            contract_id = %session.record.contract_id,
            sla = %session.sla_address,
            client = %session.record.client,
            "Provider session established"
        ),
        Err(aborted) => {
            warn!(stage = %aborted.stage, "Provider handshake aborted: {}", aborted.error)
        }
    }

    result
}
