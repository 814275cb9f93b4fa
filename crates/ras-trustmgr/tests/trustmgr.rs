//! Integration tests against a real Postgres instance, auto-migrated by
//! `#[sqlx::test]` from `ras-store`'s migrations.

use rand::rngs::OsRng;
use ras_trustmgr::{RasConfig, TrustManager};
use ras_types::{Manifest, RasError, TrustReport, MANIFEST_BIOS, MANIFEST_IMA, MANIFEST_PCR};
use ras_validator::quote;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

async fn manager_for(pool: &PgPool) -> TrustManager {
    let config = RasConfig::with_defaults("unused: from_pools dials nothing itself");
    TrustManager::from_pools(pool.clone(), pool.clone(), &config)
        .await
        .expect("create manager")
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn registers_and_finds_a_client(pool: PgPool) -> sqlx::Result<()> {
    let manager = manager_for(&pool).await;

    let row = manager
        .register_client_by_ik("cert-a", serde_json::json!({"host": "node-1"}))
        .await
        .expect("register");

    let found = manager.find_client_by_id(row.id).await.expect("find by id");
    assert_eq!(found.ikcert, "cert-a");
    assert!(!found.deleted);

    manager.release().await;
    Ok(())
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn rejects_duplicate_ik_among_live_clients(pool: PgPool) -> sqlx::Result<()> {
    let manager = manager_for(&pool).await;

    manager
        .register_client_by_ik("cert-dup", serde_json::json!({}))
        .await
        .expect("first registration");

    let err = manager
        .register_client_by_ik("cert-dup", serde_json::json!({}))
        .await
        .expect_err("second registration under the same cert must fail");
    assert!(matches!(err, RasError::AlreadyRegistered));

    manager.release().await;
    Ok(())
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn unregistering_then_reregistering_under_the_same_ik_succeeds(pool: PgPool) -> sqlx::Result<()> {
    let manager = manager_for(&pool).await;

    let first = manager
        .register_client_by_ik("cert-reuse", serde_json::json!({}))
        .await
        .expect("first registration");
    manager.unregister_client_by_id(first.id).await.expect("unregister");

    let second = manager
        .register_client_by_ik("cert-reuse", serde_json::json!({}))
        .await
        .expect("re-registration must succeed once the live uniqueness constraint no longer applies");
    assert_ne!(first.id, second.id);

    manager.release().await;
    Ok(())
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn heartbeat_reports_and_clears_pending_commands(pool: PgPool) -> sqlx::Result<()> {
    let manager = manager_for(&pool).await;
    let row = manager
        .register_client_by_ik("cert-hb", serde_json::json!({}))
        .await
        .expect("register");

    manager.update_all_nodes();
    let (commands, _nonce) = manager.handle_heartbeat(row.id).expect("heartbeat");
    assert_eq!(commands & ras_types::CMD_SEND_CONFIG, ras_types::CMD_SEND_CONFIG);

    let (commands_again, _nonce) = manager.handle_heartbeat(row.id).expect("second heartbeat");
    assert_eq!(commands_again, 0, "commands must be cleared after being read once");

    manager.release().await;
    Ok(())
}

fn pcr_values() -> Vec<(u32, [u8; 32])> {
    vec![(0, Sha256::digest(b"pcr0").into()), (1, Sha256::digest(b"pcr1").into())]
}

fn pcr_log_text(values: &[(u32, [u8; 32])]) -> String {
    values
        .iter()
        .map(|(idx, v)| format!("{} sha256 {}", hex::encode(v), idx))
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_report(priv_key: &RsaPrivateKey, client_id: i64, nonce: u64) -> TrustReport {
    let values = pcr_values();
    let selection: Vec<u32> = values.iter().map(|(i, _)| *i).collect();
    let mut concatenated = Vec::new();
    for (_, v) in &values {
        concatenated.extend_from_slice(v);
    }
    let digest: [u8; 32] = Sha256::digest(&concatenated).into();
    let quoted = quote::encode_quoted(&selection, &digest);
    let signing_key = SigningKey::<Sha256>::new(priv_key.clone());
    let signature = signing_key.sign(&quoted);

    TrustReport {
        client_id,
        nonce,
        quoted,
        signature: signature.to_vec(),
        manifests: vec![
            Manifest { key: MANIFEST_PCR.to_string(), value: pcr_log_text(&values).into_bytes() },
            Manifest { key: MANIFEST_BIOS.to_string(), value: Vec::new() },
            Manifest { key: MANIFEST_IMA.to_string(), value: Vec::new() },
        ],
    }
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn validating_an_unknown_client_fails_without_touching_the_database(pool: PgPool) -> sqlx::Result<()> {
    let manager = manager_for(&pool).await;
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let report = build_report(&priv_key, 999, 1);

    let err = manager.validate_report(&report).await.expect_err("unknown client must be rejected");
    assert!(matches!(err, RasError::NotRegistered));

    manager.release().await;
    Ok(())
}

#[sqlx::test(migrations = "../ras-store/migrations")]
async fn validate_report_surfaces_ikcertnull_for_an_unparseable_registered_cert(
    pool: PgPool,
) -> sqlx::Result<()> {
    // Registration here uses a plain string rather than a PEM-encoded X.509
    // certificate, so the cached entry has no parsed IK public key. Quote
    // verification against a real IK certificate is exercised end to end by
    // `ras-validator`'s own tests; this one checks that `TrustManager` wires
    // a client lookup failure in `ras-validator` back out correctly.
    let manager = manager_for(&pool).await;
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");

    let row = manager
        .register_client_by_ik("cert-validate", serde_json::json!({}))
        .await
        .expect("register");
    let (_commands, nonce) = manager.handle_heartbeat(row.id).expect("heartbeat for nonce");
    let report = build_report(&priv_key, row.id, nonce);

    let err = manager.validate_report(&report).await.expect_err("unparseable cert must be rejected");
    assert!(matches!(err, RasError::IKCertNull));

    manager.release().await;
    Ok(())
}
