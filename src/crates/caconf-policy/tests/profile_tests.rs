//! # 签发模板集成测试

use caconf_policy::{CertProfile, GeneralNameType, MessageDigest, PolicyError};

fn load(yaml: &str) -> Result<CertProfile, PolicyError> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("YAML 应该合法");
    CertProfile::from_document(&value)
}

#[test]
fn test_full_server_profile() {
    let profile = load(
        r#"
basic_constraints: {ca: false}
key_usage: [digitalSignature, keyEncipherment]
extended_key_usage: [serverAuth]
certificate_policies:
  - policy_identifier: "2.23.140.1.2.1"
    cps_uris: ["https://example.com/cps"]
name_constraints:
  permitted:
    - {type: DNS, value: example.com}
ocsp_no_check: "true"
ocsp_location: ["http://ocsp.example.com"]
cdp_location: ["http://crl.example.com/ca.crl"]
ca_issuers_location: ["http://example.com/ca.cer"]
default_md: SHA256
allowed_mds: [SHA256, SHA512]
subject_item_policy:
  CN: required
  O: optional
"#,
    )
    .expect("模板应该合法");

    assert_eq!(profile.basic_constraints().map(|bc| bc.ca), Some(false));
    assert_eq!(profile.key_usage(), ["digitalSignature", "keyEncipherment"]);
    assert_eq!(profile.extended_key_usage(), ["serverAuth"]);
    assert_eq!(profile.certificate_policies()[0].policy_identifier, "2.23.140.1.2.1");
    assert_eq!(
        profile.name_constraints().map(|nc| nc.permitted[0].kind),
        Some(GeneralNameType::Dns)
    );
    assert!(profile.ocsp_no_check());
    assert_eq!(profile.ocsp_location(), ["http://ocsp.example.com"]);
    assert_eq!(profile.cdp_location(), ["http://crl.example.com/ca.crl"]);
    assert_eq!(profile.ca_issuers_location(), ["http://example.com/ca.cer"]);
    assert_eq!(profile.allowed_mds(), [MessageDigest::Sha256, MessageDigest::Sha512]);
    assert_eq!(
        profile.subject_item_policy().map(|p| p.required().to_vec()),
        Some(vec!["CN".to_string()])
    );
}

#[test]
fn test_unset_default_md_is_allowed() {
    for yaml in ["{}", "allowed_mds: [SHA1]", "allowed_mds: [SHA384, SHA512]"] {
        let profile = load(yaml).expect("模板应该合法");
        assert_eq!(profile.default_md(), MessageDigest::DEFAULT);
        assert!(profile.allowed_mds().contains(&MessageDigest::DEFAULT));
    }
}

#[test]
fn test_ca_profile() {
    let profile = load(
        r#"
basic_constraints: {ca: true, path_length: 1}
key_usage: [keyCertSign, cRLSign]
inhibit_any_policy: 0
policy_constraints: {require_explicit_policy: 1, inhibit_policy_mapping: 0}
"#,
    )
    .expect("模板应该合法");

    assert_eq!(profile.basic_constraints().and_then(|bc| bc.path_length), Some(1));
    assert_eq!(profile.inhibit_any_policy(), Some(0));
    assert_eq!(
        profile.policy_constraints().and_then(|pc| pc.inhibit_policy_mapping),
        Some(0)
    );
}

#[test]
fn test_invalid_fields_rejected() {
    let cases = [
        "key_usage: digitalSignature",
        "extended_key_usage: [notAUsage]",
        "inhibit_any_policy: -1",
        "policy_constraints: {}",
        "name_constraints: {permitted: [{type: IP, value: 10.0.0.1}]}",
        "ocsp_location: [1]",
        "default_md: [SHA256]",
        "allowed_mds: SHA256",
    ];

    for yaml in cases {
        assert!(load(yaml).is_err(), "{} 应该被拒绝", yaml);
    }
}
