//! Vectors the deployed FALCON-512 verifier contract is tested against.
//!
//! `tests/data/falcon512_vectors.json` holds one public key and four
//! detached signatures produced by the C reference bindings. Each signature
//! is zero-padded to 666 bytes behind a `0x39` header.

use serde_json::Value;

use pqsigs_fn_dsa_onchain::{
    decode_public_key, parse_signature, verify, verify_bool, SignatureFormat, FALCON_512,
};

struct Vector {
    name: String,
    message: Vec<u8>,
    signature: Vec<u8>,
}

fn load() -> (Vec<u8>, Vec<Vector>) {
    let data: Value =
        serde_json::from_str(include_str!("data/falcon512_vectors.json")).expect("fixture json");
    let pk = hex::decode(data["public_key"].as_str().unwrap()).unwrap();
    let vectors = data["vectors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| Vector {
            name: v["name"].as_str().unwrap().to_string(),
            message: hex::decode(v["message"].as_str().unwrap()).unwrap(),
            signature: hex::decode(v["signature"].as_str().unwrap()).unwrap(),
        })
        .collect();
    (pk, vectors)
}

#[test]
fn test_fixture_shapes() {
    let (pk, vectors) = load();
    assert_eq!(pk.len(), FALCON_512.pk_bytes);
    assert_eq!(decode_public_key(&pk).unwrap().params, &FALCON_512);
    assert_eq!(vectors.len(), 4);

    for v in &vectors {
        assert_eq!(v.signature.len(), 666, "{}", v.name);
        let parsed = parse_signature(&v.signature).unwrap();
        assert_eq!(parsed.header.format(), SignatureFormat::Compressed);
        assert_eq!(parsed.decompress().unwrap().len(), 512);
    }
}

#[test]
fn test_all_vectors_verify() {
    let (pk, vectors) = load();
    for v in &vectors {
        let info = verify(&pk, &v.message, &v.signature)
            .unwrap_or_else(|e| panic!("{}: {}", v.name, e));
        assert!(info.accepted(), "{}: norm {}", v.name, info.norm.squared_norm);
        assert!(verify_bool(&pk, &v.message, &v.signature));
    }
}

#[test]
fn test_hello_vector_norm() {
    let (pk, vectors) = load();
    let hello = vectors.iter().find(|v| v.name == "hello").unwrap();
    assert_eq!(hello.message, b"Hello, Falcon!");

    let info = verify(&pk, &hello.message, &hello.signature).unwrap();
    assert_eq!(info.norm.squared_norm, 26_194_988);
    assert_eq!(info.norm.bound, 34_034_726);
}

#[test]
fn test_wrong_message_rejected() {
    let (pk, vectors) = load();
    assert!(!verify_bool(&pk, b"Wrong message", &vectors[0].signature));
    // Signature over one message does not verify another
    assert!(!verify_bool(&pk, &vectors[0].message, &vectors[1].signature));
    assert!(!verify_bool(&pk, &vectors[0].message, &vectors[2].signature));
}

#[test]
fn test_trailing_padding_must_be_zero() {
    let (pk, vectors) = load();
    let mut sig = vectors[0].signature.clone();
    *sig.last_mut().unwrap() = 0x01;
    let err = verify(&pk, &vectors[0].message, &sig).unwrap_err();
    assert!(err.is_decode());

    // Dropping the zero padding keeps the signature valid
    let parsed = parse_signature(&vectors[0].signature).unwrap();
    let used = pqsigs_fn_dsa_onchain::compress_payload(&parsed.decompress().unwrap())
        .unwrap()
        .len();
    let trimmed = &vectors[0].signature[..41 + used];
    assert!(verify_bool(&pk, &vectors[0].message, trimmed));
}

#[test]
fn test_wrong_public_key_rejected() {
    let (mut pk, vectors) = load();
    pk[100] ^= 0x10;
    assert!(!verify_bool(&pk, &vectors[0].message, &vectors[0].signature));
}
