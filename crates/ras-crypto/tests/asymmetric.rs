use rand::rngs::OsRng;
use ras_crypto::{asymmetric_decrypt, asymmetric_encrypt, AsymAlg, AsymMode, IDENTITY_LABEL};
use rsa::RsaPrivateKey;

#[test]
fn oaep_round_trip_with_identity_label() {
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let pub_key = priv_key.to_public_key();

    let msg = b"a 32 byte seed..................";
    let ct = asymmetric_encrypt(
        AsymAlg::Rsa,
        AsymMode::Oaep,
        &pub_key,
        msg,
        Some(IDENTITY_LABEL),
    )
    .unwrap();
    let pt = asymmetric_decrypt(
        AsymAlg::Rsa,
        AsymMode::Oaep,
        &priv_key,
        &ct,
        Some(IDENTITY_LABEL),
    )
    .unwrap();
    assert_eq!(pt, msg);
}

#[test]
fn oaep_wrong_label_fails_to_decrypt() {
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let pub_key = priv_key.to_public_key();

    let ct = asymmetric_encrypt(AsymAlg::Rsa, AsymMode::Oaep, &pub_key, b"secret", Some(b"A"))
        .unwrap();
    let result = asymmetric_decrypt(AsymAlg::Rsa, AsymMode::Oaep, &priv_key, &ct, Some(b"B"));
    assert!(result.is_err());
}

#[test]
fn pkcs1v15_round_trip() {
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let pub_key = priv_key.to_public_key();

    let ct = asymmetric_encrypt(AsymAlg::Rsa, AsymMode::Pkcs1v15, &pub_key, b"hello", None)
        .unwrap();
    let pt = asymmetric_decrypt(AsymAlg::Rsa, AsymMode::Pkcs1v15, &priv_key, &ct, None).unwrap();
    assert_eq!(pt, b"hello");
}
