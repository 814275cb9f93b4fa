use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use ras_credential::make_credential;
use ras_crypto::{asymmetric_decrypt, kdfa, symmetric_decrypt, AsymAlg, AsymMode, SymAlg, SymMode, IDENTITY_LABEL};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// `MakeCredential` round trip: unwrap the blob exactly as a TPM would.
#[test]
fn make_credential_round_trips_through_manual_unwrap() {
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let ek_pub = priv_key.to_public_key();

    let credential: Vec<u8> = (1u8..=16).collect();
    let mut name = vec![0x00u8, 0x0bu8];
    name.extend_from_slice(&Sha256::digest(b"test"));

    let result = make_credential(&ek_pub, &credential, &name).expect("make_credential");

    // Unwrap using ek_priv, exactly as a TPM would.
    let seed = asymmetric_decrypt(
        AsymAlg::Rsa,
        AsymMode::Oaep,
        &priv_key,
        &result.enc_seed,
        Some(IDENTITY_LABEL),
    )
    .expect("decrypt seed");

    let sym_key = kdfa(&seed, "STORAGE", &name, &[], 256).unwrap();
    let hmac_key = kdfa(&seed, "INTEGRITY", &[], &[], 256).unwrap();

    let integrity_len = u16::from_be_bytes([result.blob[0], result.blob[1]]) as usize;
    let integrity = &result.blob[2..2 + integrity_len];
    let enc_identity = &result.blob[2 + integrity_len..];

    let mut mac = HmacSha256::new_from_slice(&hmac_key).unwrap();
    mac.update(enc_identity);
    mac.update(&name);
    mac.verify_slice(integrity).expect("integrity HMAC must match");

    let plaintext =
        symmetric_decrypt(SymAlg::Aes, SymMode::Cfb, &sym_key, None, enc_identity).unwrap();
    let cred_len = u16::from_be_bytes([plaintext[0], plaintext[1]]) as usize;
    assert_eq!(&plaintext[2..2 + cred_len], credential.as_slice());
}

#[test]
fn rejects_empty_credential_and_oversized_credential() {
    let priv_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("keygen");
    let ek_pub = priv_key.to_public_key();
    let name = b"object-name";

    assert!(make_credential(&ek_pub, &[], name).is_err());
    assert!(make_credential(&ek_pub, &[0u8; 33], name).is_err());
    assert!(make_credential(&ek_pub, &[0u8; 16], &[]).is_err());
}
