#![deny(unsafe_code)]
#![warn(clippy::all)]

//! The murmur anonymous-signaling pipeline.
//!
//! One signaling attempt flows identity derivation → group snapshot →
//! authentication path → witness → proof → submission, with accepted
//! signals surfacing through the event notifier. External collaborators
//! (signer, group snapshot source, verifier transport, signal feed) are
//! injected as capability traits, so the pipeline runs deterministically
//! against fakes in tests and against wallets, feeds, and RPC endpoints in
//! production.

pub mod config;
pub mod gateway;
pub mod group;
pub mod identity;
pub mod notifier;
pub mod proof;
pub mod session;
pub mod signer;

pub use config::ProtocolConfig;
pub use gateway::{HttpVerifierTransport, SubmissionGateway, VerifierResponse, VerifierTransport};
pub use group::{CommitmentSource, GroupSnapshot, HttpCommitmentSource, StaticCommitmentSource};
pub use identity::IdentityManager;
pub use notifier::{ChannelSignalFeed, EventNotifier, SignalFeed, SignalHandler, SubscriptionHandle};
pub use proof::{ProofClient, ProvingTask};
pub use session::SignalSession;
pub use signer::{personal_message_hash, LocalSigner, MessageSigner};
