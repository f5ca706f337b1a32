//! Verification pipeline and issuance tests

use bearer_jwt::codec;
use bearer_jwt::*;
use serde_json::{Map, Value, json};
use std::sync::Arc;

const SECRET: &str = "test-secret-with-enough-entropy";
const NOW: i64 = 1_700_000_000;

fn engine() -> TokenEngine {
    init_tracing();
    TokenEngine::new(SECRET).expect("engine should build")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn claims(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn signed(payload: &Payload) -> String {
    engine()
        .sign(&Header::new("HS256"), payload)
        .expect("signing should succeed")
        .into_string()
}

/// Hand-assemble a token whose header declares `alg`, signed with HS256 anyway
fn forge(header_json: &str, payload_json: &str) -> String {
    let unsigned = format!(
        "{}.{}",
        codec::encode_bytes(header_json.as_bytes()),
        codec::encode_bytes(payload_json.as_bytes())
    );
    let signer = Signer::new(SECRET.as_bytes().to_vec(), AlgorithmRegistry::default());
    let sig = signer.sign(&unsigned, "HS256").expect("HS256 is registered");
    format!("{unsigned}.{sig}")
}

#[test]
fn test_issue_then_verify_round_trip() {
    let engine = engine();
    let token = engine
        .issue_at(Some(120), "HS256", claims(&[("sub", json!("user-7")), ("role", json!("admin"))]), NOW)
        .unwrap();

    let verified = engine.verify_at(token.as_str(), NOW).unwrap();
    let payload = verified.payload();
    assert_eq!(verified.header().alg(), "HS256");
    assert_eq!(verified.header().typ(), "JWT");
    assert_eq!(payload.subject(), Some("user-7"));
    assert_eq!(payload.issued_at(), Some(NOW));
    assert_eq!(payload.expiry(), Some(NOW + 120));
    assert_eq!(payload.claim("role"), Some(json!("admin")));
    assert!(payload.jwt_id().is_some_and(|jti| !jti.is_empty()));
}

#[test]
fn test_issue_against_wall_clock() {
    let engine = engine();
    let token = engine.issue_default(Map::new()).unwrap();
    assert!(engine.authenticate(token.as_str()).is_ok());
    let verified = engine.verify(token.as_str()).unwrap();
    let payload = verified.payload();
    assert_eq!(payload.expiry().unwrap() - payload.issued_at().unwrap(), 60);
}

#[test]
fn test_default_ttl_is_configurable() {
    let engine = TokenEngine::builder()
        .with_secret(SECRET)
        .with_default_ttl(3600)
        .build()
        .unwrap();
    let token = engine.issue_at(None, "HS256", Map::new(), NOW).unwrap();
    let verified = engine.verify_at(token.as_str(), NOW).unwrap();
    assert_eq!(verified.payload().expiry(), Some(NOW + 3600));
}

#[test]
fn test_issued_jti_is_unique() {
    let engine = engine();
    let a = engine.issue_at(None, "HS256", Map::new(), NOW).unwrap();
    let b = engine.issue_at(None, "HS256", Map::new(), NOW).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_extra_claims_override_generated_ones() {
    let engine = engine();
    let token = engine
        .issue_at(Some(60), "HS256", claims(&[("exp", json!(NOW + 5)), ("jti", json!("fixed"))]), NOW)
        .unwrap();
    let verified = engine.verify_at(token.as_str(), NOW).unwrap();
    assert_eq!(verified.payload().expiry(), Some(NOW + 5));
    assert_eq!(verified.payload().jwt_id(), Some("fixed"));
}

#[test]
fn test_mistyped_extra_claim_fails_issuance() {
    let result = engine().issue_at(None, "HS256", claims(&[("exp", json!("never"))]), NOW);
    let err = result.unwrap_err();
    assert!(matches!(err, JwtError::InvalidClaim(_)));
    assert_eq!(err.disposition(), Disposition::InternalError);
}

#[test]
fn test_empty_optional_fields_round_trip() {
    let payload = Payload::new();
    let token = signed(&payload);
    let verified = engine().verify_at(&token, NOW).unwrap();
    assert_eq!(verified.payload(), &payload);
}

#[test]
fn test_expiry_boundary() {
    let engine = engine();
    let expired = signed(&Payload::new().with_expiry(NOW - 1));
    assert_eq!(engine.verify_at(&expired, NOW), Err(JwtError::NotActiveOrInvalid));

    let live = signed(&Payload::new().with_expiry(NOW + 1));
    assert!(engine.verify_at(&live, NOW).is_ok());

    let at_expiry = signed(&Payload::new().with_expiry(NOW));
    assert_eq!(engine.verify_at(&at_expiry, NOW), Err(JwtError::NotActiveOrInvalid));

    let forever = signed(&Payload::new().with_subject("no-exp"));
    assert!(engine.verify_at(&forever, i64::MAX).is_ok());
}

#[test]
fn test_not_before_boundary() {
    let engine = engine();
    let future = signed(&Payload::new().with_not_before(NOW + 1000));
    assert_eq!(engine.verify_at(&future, NOW), Err(JwtError::NotActiveOrInvalid));

    for nbf in [NOW, NOW - 1] {
        let token = signed(&Payload::new().with_not_before(nbf).with_expiry(NOW + 60));
        assert!(engine.verify_at(&token, NOW).is_ok(), "nbf = {nbf}");
    }
}

#[test]
fn test_issued_in_future_rejected() {
    let token = signed(&Payload::new().with_issued_at(NOW + 10));
    assert_eq!(engine().verify_at(&token, NOW), Err(JwtError::NotActiveOrInvalid));
}

#[test]
fn test_unsupported_algorithms_rejected_at_issuance() {
    let engine = engine();
    for alg in ["none", "HS512", "HS384", "RS256", "hs256", ""] {
        assert_eq!(
            engine.issue_at(None, alg, Map::new(), NOW),
            Err(JwtError::UnsupportedAlgorithm(alg.to_string())),
            "alg = {alg:?}"
        );
    }
}

#[test]
fn test_unsupported_algorithms_rejected_at_verification() {
    let engine = engine();
    for alg in ["none", "HS512", "RS256"] {
        let token = forge(&format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#), r#"{"sub":"x"}"#);
        assert_eq!(
            engine.verify_at(&token, NOW),
            Err(JwtError::UnsupportedAlgorithm(alg.to_string()))
        );
    }
}

#[test]
fn test_none_algorithm_with_empty_signature_is_structural_failure() {
    let unsigned = format!(
        "{}.{}",
        codec::encode_bytes(br#"{"alg":"none","typ":"JWT"}"#),
        codec::encode_bytes(br#"{"sub":"admin"}"#)
    );
    assert_eq!(
        engine().verify_at(&format!("{unsigned}."), NOW),
        Err(JwtError::MalformedStructure)
    );
}

#[test]
fn test_wider_registry_accepts_registered_variants() {
    let engine = TokenEngine::builder()
        .with_secret(SECRET)
        .with_registry(AlgorithmRegistry::new([Algorithm::Hs256, Algorithm::Hs512]))
        .build()
        .unwrap();
    let token = engine.issue_at(None, "HS512", Map::new(), NOW).unwrap();
    let verified = engine.verify_at(token.as_str(), NOW).unwrap();
    assert_eq!(verified.header().alg(), "HS512");

    // An HS256-only engine with the same secret refuses it
    assert_eq!(
        self::engine().verify_at(token.as_str(), NOW),
        Err(JwtError::UnsupportedAlgorithm("HS512".to_string()))
    );
}

#[test]
fn test_structural_rejection() {
    let engine = engine();
    let valid = signed(&Payload::new());
    let parts: Vec<&str> = valid.split('.').collect();

    let candidates = [
        parts[0].to_string(),
        format!("{}.{}", parts[0], parts[1]),
        format!("{valid}.{}", parts[2]),
        format!("{valid}.x.y"),
        format!(".{}.{}", parts[1], parts[2]),
        format!("{}..{}", parts[0], parts[2]),
        format!("{}.{}.", parts[0], parts[1]),
        String::new(),
    ];
    for token in candidates {
        assert_eq!(engine.verify_at(&token, NOW), Err(JwtError::MalformedStructure), "{token:?}");
    }
}

#[test]
fn test_structure_checked_before_decoding() {
    // Garbage segments, but four of them
    assert_eq!(
        engine().verify_at("!!.??.**.##", NOW),
        Err(JwtError::MalformedStructure)
    );
}

#[test]
fn test_oversized_token_rejected() {
    let engine = TokenEngine::builder()
        .with_secret(SECRET)
        .with_max_token_len(64)
        .build()
        .unwrap();
    let big = Payload::new().with_subject("x".repeat(128));
    let token = engine.sign(&Header::new("HS256"), &big).unwrap();
    assert_eq!(engine.verify_at(token.as_str(), NOW), Err(JwtError::MalformedStructure));
}

#[test]
fn test_malformed_segments() {
    let engine = engine();
    let good = signed(&Payload::new());
    let parts: Vec<&str> = good.split('.').collect();

    let bad_base64 = format!("{}.@@@@.{}", parts[0], parts[2]);
    assert!(matches!(engine.verify_at(&bad_base64, NOW), Err(JwtError::MalformedInput(_))));

    let not_object = forge(r#"{"alg":"HS256"}"#, "[1,2,3]");
    assert!(matches!(engine.verify_at(&not_object, NOW), Err(JwtError::MalformedInput(_))));

    let bad_json = forge(r#"{"alg":"HS256""#, "{}");
    assert!(matches!(engine.verify_at(&bad_json, NOW), Err(JwtError::MalformedInput(_))));

    let missing_alg = forge(r#"{"typ":"JWT"}"#, "{}");
    assert!(matches!(engine.verify_at(&missing_alg, NOW), Err(JwtError::MalformedInput(_))));

    let empty_alg = forge(r#"{"alg":"","typ":"JWT"}"#, "{}");
    assert!(matches!(engine.verify_at(&empty_alg, NOW), Err(JwtError::MalformedInput(_))));

    let string_exp = forge(r#"{"alg":"HS256"}"#, r#"{"exp":"tomorrow"}"#);
    assert!(matches!(engine.verify_at(&string_exp, NOW), Err(JwtError::MalformedInput(_))));
}

#[test]
fn test_decoded_header_defaults_and_extensions() {
    let token = forge(r#"{"alg":"HS256","kid":"k1","x5t":{"a":1}}"#, r#"{"sub":"s","tenant":"acme"}"#);
    let verified = engine().verify_at(&token, NOW).unwrap();
    let header = verified.header();
    assert_eq!(header.typ(), "JWT");
    assert_eq!(header.cty(), None);
    assert_eq!(header.extension("kid"), Some(&json!("k1")));
    assert_eq!(header.extension("x5t"), Some(&json!({"a": 1})));
    assert_eq!(verified.payload().claim("tenant"), Some(json!("acme")));
}

#[test]
fn test_signature_covers_received_bytes() {
    // Same claims, different key order: a different token that still verifies
    let token = forge(r#"{"typ":"JWT","alg":"HS256"}"#, r#"{"b":1,"a":2}"#);
    assert!(engine().verify_at(&token, NOW).is_ok());
}

#[test]
fn test_signature_mismatch() {
    let token = signed(&Payload::new().with_subject("alice"));
    let other = TokenEngine::new("some-other-secret").unwrap();
    assert_eq!(other.verify_at(&token, NOW), Err(JwtError::SignatureMismatch));

    // Payload swapped between two valid tokens
    let mallory = signed(&Payload::new().with_subject("mallory"));
    let a: Vec<&str> = token.split('.').collect();
    let m: Vec<&str> = mallory.split('.').collect();
    let spliced = format!("{}.{}.{}", a[0], m[1], a[2]);
    assert_eq!(engine().verify_at(&spliced, NOW), Err(JwtError::SignatureMismatch));
}

#[test]
fn test_hook_runs_before_signature_check() {
    let token = signed(&Payload::new().with_subject("bob"));
    let other = TokenEngine::new("some-other-secret").unwrap();

    let result = other.verify_with_at(&token, |_: &Header, _: &Payload| Err(HookRejection::from("nope")), NOW);
    assert_eq!(result, Err(JwtError::CustomValidationFailed("nope".to_string())));
}

#[test]
fn test_hook_sees_decoded_claims() {
    let token = signed(&Payload::new().with_subject("bob").with_audience("api"));
    let only_alice = |_: &Header, payload: &Payload| {
        if payload.subject() == Some("alice") {
            Ok(())
        } else {
            Err(HookRejection::new("subject not allowed"))
        }
    };
    assert_eq!(
        engine().verify_with_at(&token, only_alice, NOW),
        Err(JwtError::CustomValidationFailed("subject not allowed".to_string()))
    );
    assert!(engine()
        .verify_with_at(&token, |h: &Header, _: &Payload| if h.alg() == "HS256" { Ok(()) } else { Err("alg".into()) }, NOW)
        .is_ok());
}

#[test]
fn test_hook_not_called_for_inactive_token() {
    let token = signed(&Payload::new().with_expiry(NOW - 1));
    let called = std::cell::Cell::new(false);
    let result = engine().verify_with_at(
        &token,
        |_: &Header, _: &Payload| {
            called.set(true);
            Ok(())
        },
        NOW,
    );
    assert_eq!(result, Err(JwtError::NotActiveOrInvalid));
    assert!(!called.get());
}

#[test]
fn test_policy_failure_matches_expiry_failure() {
    let engine = TokenEngine::builder()
        .with_secret(SECRET)
        .with_policy(RequireAudience("api".to_string()))
        .build()
        .unwrap();

    let wrong_audience = engine
        .sign(&Header::new("HS256"), &Payload::new().with_audience("web"))
        .unwrap();
    let expired = engine
        .sign(&Header::new("HS256"), &Payload::new().with_audience("api").with_expiry(NOW - 1))
        .unwrap();
    let good = engine
        .sign(&Header::new("HS256"), &Payload::new().with_audience("api"))
        .unwrap();

    let a = engine.verify_at(wrong_audience.as_str(), NOW).unwrap_err();
    let b = engine.verify_at(expired.as_str(), NOW).unwrap_err();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
    assert!(engine.verify_at(good.as_str(), NOW).is_ok());
}

#[test]
fn test_closure_policy() {
    let engine = TokenEngine::builder()
        .with_secret(SECRET)
        .with_policy(|payload: &Payload| payload.claim("scope") == Some(json!("read")))
        .build()
        .unwrap();
    let token = engine
        .issue_at(None, "HS256", claims(&[("scope", json!("write"))]), NOW)
        .unwrap();
    assert_eq!(engine.verify_at(token.as_str(), NOW), Err(JwtError::NotActiveOrInvalid));
}

#[test]
fn test_missing_secret() {
    assert_eq!(TokenEngine::builder().build().unwrap_err(), JwtError::MissingSecret);
    assert_eq!(TokenEngine::new("").unwrap_err(), JwtError::MissingSecret);
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = Arc::new(engine());
    let token = engine.issue_at(None, "HS256", Map::new(), NOW).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let token = token.clone();
            std::thread::spawn(move || engine.verify_at(token.as_str(), NOW).is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_engine_debug_hides_secret() {
    let printed = format!("{:?}", engine());
    assert!(!printed.contains(SECRET));
}

#[test]
fn test_authenticate_with_hook() {
    let engine = engine();
    let token = engine.issue_default(claims(&[("tenant", json!("acme"))])).unwrap();
    let same_tenant = |_: &Header, payload: &Payload| match payload.claim("tenant") {
        Some(Value::String(tenant)) if tenant == "acme" => Ok(()),
        _ => Err(HookRejection::from("wrong tenant")),
    };
    assert_eq!(engine.authenticate_with(token.as_str(), same_tenant), Ok(()));
    assert_eq!(
        engine.authenticate_with(token.as_str(), |_: &Header, _: &Payload| Err("revoked".into())),
        Err(JwtError::CustomValidationFailed("revoked".to_string()))
    );
}

#[test]
fn test_non_positive_ttl_rejected() {
    let engine = engine();
    for ttl in [0, -5] {
        assert_eq!(
            engine.issue_at(Some(ttl), "HS256", Map::new(), NOW),
            Err(JwtError::InvalidTtl(ttl))
        );
        let built = TokenEngine::builder().with_secret(SECRET).with_default_ttl(ttl).build();
        assert_eq!(built.unwrap_err(), JwtError::InvalidTtl(ttl));
    }
    assert_eq!(JwtError::InvalidTtl(0).disposition(), Disposition::InternalError);
}

#[test]
fn test_duplicate_claim_rejected() {
    let token = forge(r#"{"alg":"HS256"}"#, r#"{"exp":1,"exp":9999999999}"#);
    assert!(matches!(engine().verify_at(&token, NOW), Err(JwtError::MalformedInput(_))));

    let token = forge(r#"{"alg":"HS256","alg":"none"}"#, r#"{"sub":"x"}"#);
    assert!(matches!(engine().verify_at(&token, NOW), Err(JwtError::MalformedInput(_))));
}

#[test]
fn test_type_and_content_type_round_trip() {
    let engine = engine();
    let header = Header::new("HS256").with_content_type("JWT").with_type("at+jwt");
    let token = engine.sign(&header, &Payload::new().with_subject("nested")).unwrap();

    let verified = engine.verify_at(token.as_str(), NOW).unwrap();
    assert_eq!(verified.header(), &header);
    assert_eq!(verified.header().typ(), "at+jwt");
    assert_eq!(verified.header().cty(), Some("JWT"));
}
