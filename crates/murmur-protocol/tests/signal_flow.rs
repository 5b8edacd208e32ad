//! End-to-end pipeline tests against a simulated verifier.
//!
//! The verifier here mirrors the contract side: it holds the accepted
//! root and the scope, recomputes the signal hash from the submitted
//! payload, runs real Groth16 verification, and enforces nullifier
//! uniqueness. Everything runs in-process; no network is involved.

use async_trait::async_trait;
use murmur_crypto::{
    fr_to_fe, hash_signal, Groth16Prover, Groth16Verifier, MembershipTree, SignalVerifier,
};
use murmur_protocol::{
    ChannelSignalFeed, EventNotifier, IdentityManager, LocalSigner, ProtocolConfig,
    SignalSession, StaticCommitmentSource, VerifierResponse, VerifierTransport,
};
use murmur_types::{
    FieldElement, MurmurError, MurmurResult, NewSignal, PublicSignals, SignalRequest,
    SubmissionResult,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

const IDENTITY_MESSAGE: &str = "Sign this message to create your identity!";
const GROUP_KEYS: [[u8; 32]; 4] = [[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]];
// Key 3 sits at leaf index 2 of the registered group.
const OUR_KEY: [u8; 32] = [3u8; 32];

fn fe(n: u64) -> FieldElement {
    fr_to_fe(&ark_bn254::Fr::from(n))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

async fn derive_commitment(key: &[u8; 32]) -> FieldElement {
    let manager = IdentityManager::new(Arc::new(LocalSigner::from_secret_bytes(key).unwrap()));
    manager
        .derive_identity(IDENTITY_MESSAGE)
        .await
        .unwrap()
        .commitment()
}

async fn group_commitments() -> Vec<FieldElement> {
    let mut commitments = Vec::new();
    for key in &GROUP_KEYS {
        commitments.push(derive_commitment(key).await);
    }
    commitments
}

/// Contract-side double of the external verifier.
struct LocalVerifier {
    verifier: Groth16Verifier,
    root: FieldElement,
    external_nullifier: FieldElement,
    used_nullifiers: Mutex<HashSet<FieldElement>>,
    accepted: mpsc::Sender<NewSignal>,
}

#[async_trait]
impl VerifierTransport for LocalVerifier {
    async fn submit(&self, request: &SignalRequest) -> MurmurResult<VerifierResponse> {
        if self
            .used_nullifiers
            .lock()
            .unwrap()
            .contains(&request.nullifier_hash)
        {
            return Ok(VerifierResponse::Rejected("nullifier already used".into()));
        }

        // The verifier recomputes the signal hash from the payload; a proof
        // bound to different content cannot pass.
        let signals = PublicSignals {
            root: self.root,
            nullifier_hash: request.nullifier_hash,
            signal_hash: hash_signal(&request.signal),
            external_nullifier: self.external_nullifier,
        };

        if !self.verifier.verify(&request.proof, &signals)? {
            return Ok(VerifierResponse::Rejected("invalid proof".into()));
        }

        self.used_nullifiers
            .lock()
            .unwrap()
            .insert(request.nullifier_hash);
        let _ = self
            .accepted
            .send(NewSignal {
                signal: request.signal.clone(),
            })
            .await;
        Ok(VerifierResponse::Accepted)
    }
}

struct Fixture {
    session: SignalSession,
    root: FieldElement,
    external_nullifier: FieldElement,
    events: ChannelSignalFeed,
}

/// Group of four commitments at depth 2, our identity at leaf index 2.
async fn fixture() -> Fixture {
    init_tracing();

    let (prover, verifier) = Groth16Prover::setup(2).unwrap();
    let config = ProtocolConfig::default().with_tree_depth(2);

    let commitments = group_commitments().await;
    let tree = MembershipTree::build(&commitments, 2).unwrap();
    let root = tree.root();
    let external_nullifier = fe(2024);

    let (accepted_tx, events) = ChannelSignalFeed::channel(16);
    let transport = Arc::new(LocalVerifier {
        verifier,
        root,
        external_nullifier,
        used_nullifiers: Mutex::new(HashSet::new()),
        accepted: accepted_tx,
    });

    let session = SignalSession::new(
        Arc::new(LocalSigner::from_secret_bytes(&OUR_KEY).unwrap()),
        Arc::new(StaticCommitmentSource::new(commitments)),
        Arc::new(prover),
        transport,
        config,
    );

    Fixture {
        session,
        root,
        external_nullifier,
        events,
    }
}

/// Prove directly against the fixture's group, bypassing the session, so
/// the same `(proof, signals)` pair can be submitted more than once.
async fn prove_once(
    fixture: &Fixture,
    payload: &[u8],
) -> (murmur_types::SolidityProof, PublicSignals) {
    let manager =
        IdentityManager::new(Arc::new(LocalSigner::from_secret_bytes(&OUR_KEY).unwrap()));
    let identity = manager.derive_identity(IDENTITY_MESSAGE).await.unwrap();

    let commitments = group_commitments().await;
    let tree = MembershipTree::build(&commitments, 2).unwrap();
    assert_eq!(tree.root(), fixture.root);

    let path = tree.auth_path(&identity.commitment()).unwrap();
    assert_eq!(path.depth(), 2);

    let client = fixture.session.proof_client();
    let witness = client
        .build_witness(&identity, &path, payload, fixture.external_nullifier)
        .unwrap();
    client.prove(witness).await.unwrap()
}

#[tokio::test]
async fn full_signal_flow_accepts_and_notifies() {
    let fixture = fixture().await;

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let subscription = EventNotifier::subscribe(
        fixture.events,
        Box::new(move |text| sink.lock().unwrap().push(text)),
    );

    let result = fixture
        .session
        .signal(b"Hello world!!!", fixture.external_nullifier)
        .await
        .unwrap();
    assert_eq!(result, SubmissionResult::Accepted);

    for _ in 0..100 {
        if !received.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(received.lock().unwrap().as_slice(), ["Hello world!!!"]);

    subscription.unsubscribe();
}

#[tokio::test]
async fn proof_binds_root_and_signal_content() {
    let fixture = fixture().await;

    let (proof, signals) = prove_once(&fixture, b"Hello world!!!").await;

    assert_eq!(signals.root, fixture.root);
    assert_eq!(signals.signal_hash, hash_signal(b"Hello world!!!"));

    // Same proof, tampered payload: the verifier recomputes the signal
    // hash and refuses.
    let tampered = fixture
        .session
        .gateway()
        .submit(&proof, &signals, b"Tampered payload")
        .await;
    assert_eq!(tampered, SubmissionResult::Rejected("invalid proof".into()));

    // The untampered submission still lands afterwards.
    let result = fixture
        .session
        .gateway()
        .submit(&proof, &signals, b"Hello world!!!")
        .await;
    assert_eq!(result, SubmissionResult::Accepted);
}

#[tokio::test]
async fn replayed_proof_is_rejected_second_time() {
    let fixture = fixture().await;

    let (proof, signals) = prove_once(&fixture, b"Hello world!!!").await;

    let first = fixture
        .session
        .gateway()
        .submit(&proof, &signals, b"Hello world!!!")
        .await;
    assert_eq!(first, SubmissionResult::Accepted);

    let second = fixture
        .session
        .gateway()
        .submit(&proof, &signals, b"Hello world!!!")
        .await;
    assert_eq!(
        second,
        SubmissionResult::Rejected("nullifier already used".into())
    );
}

#[tokio::test]
async fn second_session_attempt_hits_the_nullifier_registry() {
    let fixture = fixture().await;

    let first = fixture
        .session
        .signal(b"Hello world!!!", fixture.external_nullifier)
        .await
        .unwrap();
    assert_eq!(first, SubmissionResult::Accepted);

    // A fresh proof from the same identity in the same scope carries the
    // same nullifier hash; the registry catches the repeat.
    let second = fixture
        .session
        .signal(b"A different message", fixture.external_nullifier)
        .await
        .unwrap();
    assert_eq!(
        second,
        SubmissionResult::Rejected("nullifier already used".into())
    );
}

#[tokio::test]
async fn unregistered_identity_cannot_build_a_path() {
    let fixture = fixture().await;

    // Key 9 was never registered; its commitment is not in the snapshot.
    let outsider = SignalSession::new(
        Arc::new(LocalSigner::from_secret_bytes(&[9u8; 32]).unwrap()),
        Arc::new(StaticCommitmentSource::new(group_commitments().await)),
        Arc::new(Groth16Prover::setup(2).unwrap().0),
        Arc::new(LocalVerifier {
            verifier: Groth16Prover::setup(2).unwrap().1,
            root: fixture.root,
            external_nullifier: fixture.external_nullifier,
            used_nullifiers: Mutex::new(HashSet::new()),
            accepted: ChannelSignalFeed::channel(1).0,
        }),
        ProtocolConfig::default().with_tree_depth(2),
    );

    let err = outsider
        .signal(b"hello", fixture.external_nullifier)
        .await
        .unwrap_err();
    assert!(matches!(err, MurmurError::MembershipNotFound(_)));
}
