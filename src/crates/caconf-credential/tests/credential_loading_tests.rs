//! 凭据加载集成测试

use caconf_credential::{
    load_credential, CredentialError, DirectoryEngine, EngineRegistry, KeyOrigin, RootPath,
};
use rcgen::{CertificateParams, DnType, KeyPair};
use serde_yaml::Value;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    key: KeyPair,
}

impl Fixture {
    // 在临时目录中写入 ca.pem / ca.key / keys/ca-signing.pem / ca.p12
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, "Fixture CA");
        let cert = params.self_signed(&key).unwrap();

        fs::write(dir.path().join("ca.pem"), cert.pem()).unwrap();
        fs::write(dir.path().join("ca.key"), key.serialize_pem()).unwrap();
        fs::create_dir(dir.path().join("keys")).unwrap();
        fs::write(dir.path().join("keys/ca-signing.pem"), key.serialize_pem()).unwrap();

        let pfx = p12::PFX::new(cert.der(), &key.serialize_der(), None, "changeit", "ca").unwrap();
        fs::write(dir.path().join("ca.p12"), pfx.to_der()).unwrap();

        Self { dir, key }
    }

    fn root(&self) -> RootPath {
        RootPath::new(self.dir.path()).unwrap()
    }

    fn engines(&self) -> EngineRegistry {
        EngineRegistry::new().with_engine(Arc::new(DirectoryEngine::new("softhsm", self.dir.path().join("keys"))))
    }

    fn load(&self, yaml: &str) -> Result<Option<caconf_credential::Credential>, CredentialError> {
        let declaration: Value = serde_yaml::from_str(yaml).unwrap();
        load_credential("ca_cert", &declaration, &self.root(), &self.engines())
    }
}

// 测试独立文件凭据
#[test]
fn test_key_file_credential() {
    let fixture = Fixture::new();
    let credential = fixture.load("cert: ca.pem\nkey: ca.key").unwrap().unwrap();

    assert!(credential.has_private_key());
    assert!(credential.certificate().subject().contains("Fixture CA"));
    assert_eq!(
        credential.private_key().unwrap().origin(),
        &KeyOrigin::File("ca.key".to_string())
    );
}

// 测试只有证书时没有私钥
#[test]
fn test_cert_only_credential_has_no_key() {
    let fixture = Fixture::new();
    let credential = fixture.load("cert: ca.pem").unwrap().unwrap();
    assert!(!credential.has_private_key());
}

// 测试 PKCS#12 凭据
#[test]
fn test_pkcs12_credential() {
    let fixture = Fixture::new();
    let credential = fixture.load("pkcs12: ca.p12\npassword: changeit").unwrap().unwrap();

    assert!(credential.has_private_key());
    assert_eq!(credential.certificate().public_key_raw(), fixture.key.public_key_raw());
}

// 测试引擎凭据
#[test]
fn test_engine_credential() {
    let fixture = Fixture::new();
    let credential = fixture
        .load("engine: softhsm\nkey_name: ca-signing\ncert: ca.pem")
        .unwrap()
        .unwrap();

    assert_eq!(
        credential.private_key().unwrap().origin(),
        &KeyOrigin::Engine {
            engine: "softhsm".to_string(),
            key_name: "ca-signing".to_string(),
        }
    );
}

// 测试未注册的引擎
#[test]
fn test_unknown_engine() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.load("engine: pkcs11\nkey_name: ca\ncert: ca.pem").unwrap_err(),
        CredentialError::UnknownEngine("pkcs11".to_string())
    );
}

// 测试引擎与 PKCS#12 同时出现时在读取文件前失败
#[test]
fn test_engine_and_pkcs12_conflict() {
    let fixture = Fixture::new();
    let err = fixture
        .load("engine: softhsm\nkey_name: k\ncert: missing.pem\npkcs12: missing.p12")
        .unwrap_err();
    assert!(matches!(err, CredentialError::ConflictingCredentialSource { .. }));
}

// 测试私钥与证书不匹配
#[test]
fn test_mismatched_key_file() {
    let fixture = Fixture::new();
    fs::write(fixture.dir.path().join("other.key"), KeyPair::generate().unwrap().serialize_pem()).unwrap();

    assert!(matches!(
        fixture.load("cert: ca.pem\nkey: other.key"),
        Err(CredentialError::KeyMismatch(_))
    ));
}

// 测试缺失文件
#[test]
fn test_missing_file() {
    let fixture = Fixture::new();
    assert!(matches!(fixture.load("cert: nope.pem"), Err(CredentialError::Io { .. })));
}

// 测试没有来源标记
#[test]
fn test_no_markers_yields_nothing() {
    let fixture = Fixture::new();
    assert!(fixture.load("password: x").unwrap().is_none());
}
