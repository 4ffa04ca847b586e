//! Glue that runs the SLA roles: logging, certificates, deadlines and the
//! concurrent client/provider runners.
//!
//! The protocol crates never time out on their own. Every deadline is
//! imposed here, from [`slalink_config::HandshakeConfig::timeout`].

pub mod logging;

mod certs;
pub use certs::{load_certificates, Certificates};

mod runner;
pub use runner::{
    run_checkpoints, run_client, run_provider, run_session, Deployment, EstablishedSession, Roles,
};
