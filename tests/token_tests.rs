//! Properties of token issuance and validation.
//!
//! Tests cover:
//! - Freshly issued access tokens validate
//! - Tokens stop validating exactly at expiry and never recover
//! - Any single-bit change to the signature invalidates a token
//! - Claim shape of an issued access token
//! - Concurrent validation is side-effect free

mod common;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use wordhoard::db::{User, UserRole};
use wordhoard::jwt::{JwtConfig, SigningKey, TokenError, TokenTtl};

fn config() -> JwtConfig {
    JwtConfig::new(
        &SigningKey::from_bytes(common::TEST_KEY.to_vec()).unwrap(),
        TokenTtl::default(),
    )
}

fn principal(email: &str, role: UserRole) -> User {
    User {
        id: 7,
        uuid: "6b1f3c7e-0d55-4c1e-8f0e-7f1c7a9e2b10".to_string(),
        email: email.to_string(),
        name: "Test".to_string(),
        avatar_url: None,
        role,
    }
}

fn decode_payload(token: &str) -> serde_json::Value {
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}

#[test]
fn test_access_token_valid_after_issue() {
    let jwt = config();
    for (email, role) in [
        ("a@x.com", UserRole::User),
        ("root@x.com", UserRole::Admin),
        ("mixed.Case+tag@sub.x.org", UserRole::User),
    ] {
        let pair = jwt.issuer().issue(&principal(email, role)).unwrap();
        assert!(jwt.validator().is_valid(&pair.access_token), "{}", email);
        assert!(jwt.validator().is_valid(&pair.refresh_token), "{}", email);
    }
}

#[test]
fn test_access_claims_scenario() {
    let jwt = config();
    let now = common::now();
    let pair = jwt
        .issuer()
        .issue_at(&principal("a@x.com", UserRole::User), now)
        .unwrap();

    let claims = decode_payload(&pair.access_token);
    assert_eq!(claims["sub"], "a@x.com");
    assert_eq!(claims["auth"], "ROLE_USER");
    assert_eq!(claims["iat"], now);
    assert_eq!(claims["exp"], now + 3600);

    let refresh = decode_payload(&pair.refresh_token);
    assert_eq!(refresh["sub"], "a@x.com");
    assert!(refresh.get("auth").is_none());
    assert_eq!(refresh["exp"], now + 30 * 24 * 3600);
}

#[test]
fn test_header_is_hs256() {
    let jwt = config();
    let pair = jwt
        .issuer()
        .issue(&principal("a@x.com", UserRole::User))
        .unwrap();
    let header = jsonwebtoken::decode_header(&pair.access_token).unwrap();
    assert_eq!(header.alg, jsonwebtoken::Algorithm::HS256);
}

#[test]
fn test_validity_ends_at_expiry_and_stays_ended() {
    let jwt = JwtConfig::new(
        &SigningKey::from_bytes(common::TEST_KEY.to_vec()).unwrap(),
        TokenTtl::from_secs(60, 600).unwrap(),
    );
    let issued = 1_800_000_000;
    let pair = jwt
        .issuer()
        .issue_at(&principal("a@x.com", UserRole::User), issued)
        .unwrap();
    let validator = jwt.validator();

    assert!(validator.is_valid_at(&pair.access_token, issued));
    assert!(validator.is_valid_at(&pair.access_token, issued + 59));
    for later in [issued + 60, issued + 61, issued + 600, issued + 1_000_000] {
        assert!(!validator.is_valid_at(&pair.access_token, later), "at {}", later);
    }

    assert!(validator.is_valid_at(&pair.refresh_token, issued + 599));
    assert!(!validator.is_valid_at(&pair.refresh_token, issued + 600));
}

#[test]
fn test_expired_token_reports_expired() {
    let jwt = config();
    let pair = jwt
        .issuer()
        .issue_at(&principal("a@x.com", UserRole::User), 1_000)
        .unwrap();
    assert_eq!(
        jwt.validator().validate(&pair.access_token).unwrap_err(),
        TokenError::Expired
    );
    assert_eq!(
        jwt.validator()
            .subject_even_if_expired(&pair.access_token)
            .unwrap(),
        "a@x.com"
    );
}

#[test]
fn test_any_signature_bit_flip_invalidates() {
    let jwt = config();
    let pair = jwt
        .issuer()
        .issue(&principal("a@x.com", UserRole::User))
        .unwrap();

    let (signed_part, signature) = pair.access_token.rsplit_once('.').unwrap();
    let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();
    assert_eq!(signature.len(), 32);

    for bit in 0..signature.len() * 8 {
        let mut flipped = signature.clone();
        flipped[bit / 8] ^= 1 << (bit % 8);
        let tampered = format!("{}.{}", signed_part, URL_SAFE_NO_PAD.encode(&flipped));

        assert!(!jwt.validator().is_valid(&tampered), "bit {} accepted", bit);
        assert_eq!(
            jwt.validator().validate(&tampered).unwrap_err(),
            TokenError::BadSignature
        );
    }
}

#[test]
fn test_payload_substitution_invalidates() {
    let jwt = config();
    let now = common::now();
    let alice = jwt
        .issuer()
        .issue_at(&principal("alice@x.com", UserRole::User), now)
        .unwrap();
    let mallory = jwt
        .issuer()
        .issue_at(&principal("mallory@x.com", UserRole::Admin), now)
        .unwrap();

    // Mallory's header+payload with Alice's signature.
    let mallory_parts: Vec<&str> = mallory.access_token.split('.').collect();
    let alice_sig = alice.access_token.rsplit('.').next().unwrap();
    let forged = format!("{}.{}.{}", mallory_parts[0], mallory_parts[1], alice_sig);

    assert!(!jwt.validator().is_valid(&forged));
}

#[test]
fn test_foreign_key_rejected() {
    let jwt = config();
    let other = JwtConfig::new(
        &SigningKey::from_bytes(vec![0x24; 32]).unwrap(),
        TokenTtl::default(),
    );
    let pair = other
        .issuer()
        .issue(&principal("a@x.com", UserRole::User))
        .unwrap();
    assert!(!jwt.validator().is_valid(&pair.access_token));
}

#[test]
fn test_concurrent_validation_is_consistent() {
    let jwt = config();
    let user = principal("a@x.com", UserRole::User);
    let good = jwt.issuer().issue(&user).unwrap().access_token;
    let expired = jwt.issuer().issue_at(&user, 1_000).unwrap().access_token;

    let results: Vec<(bool, bool, Option<String>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..32)
            .map(|_| {
                scope.spawn(|| {
                    let validator = jwt.validator();
                    let mut last = (false, true, None);
                    for _ in 0..50 {
                        last = (
                            validator.is_valid(&good),
                            validator.is_valid(&expired),
                            validator.validate(&good).ok().map(|c| c.sub),
                        );
                    }
                    last
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 32);
    for result in results {
        assert_eq!(result, (true, false, Some("a@x.com".to_string())));
    }

    // The tokens themselves still behave the same afterwards.
    assert!(jwt.validator().is_valid(&good));
    assert!(!jwt.validator().is_valid(&expired));
}
