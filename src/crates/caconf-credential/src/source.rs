//! # 凭据来源
//!
//! 解析配置文档中的凭据声明，判断使用哪种来源，再按来源加载。
//!
//! 标记优先级：`engine` > `pkcs12` > `cert`。三者都不存在时不产生凭据。

use crate::certificate::Certificate;
use crate::credential::Credential;
use crate::engine::EngineRegistry;
use crate::error::CredentialError;
use crate::files::RootPath;
use crate::key::{KeyOrigin, PrivateKey};
use crate::pkcs12::load_pkcs12;
use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

/// 凭据声明解析出的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// 私钥来自引擎，证书来自文件
    Engine {
        engine: String,
        key_name: String,
        cert: String,
    },
    /// 证书与私钥同在一个 PKCS#12 文件中
    Pkcs12 { path: String, password: Option<String> },
    /// 证书与私钥分别来自文件
    KeyFile {
        cert: String,
        key: String,
        password: Option<String>,
    },
    /// 只有证书
    CertOnly { cert: String },
}

impl CredentialSource {
    /// 解析凭据声明
    ///
    /// `field` 为声明所在的选项名，只用于错误消息。
    pub fn resolve(field: &str, declaration: &Value) -> Result<Option<Self>, CredentialError> {
        let map = match declaration {
            Value::Mapping(map) => map,
            other => {
                return Err(CredentialError::InvalidArgumentShape {
                    field: field.to_string(),
                    expected: "映射".to_string(),
                    actual: kind_of(other).to_string(),
                })
            }
        };

        // 互斥关系只看标记是否出现，先于取值类型检查
        let has = |key: &str| !matches!(map.get(key), None | Some(Value::Null));
        if has("engine") && has("pkcs12") {
            return Err(CredentialError::conflict("engine", "pkcs12"));
        }
        if has("engine") && has("key") {
            return Err(CredentialError::conflict("engine", "key"));
        }
        if has("pkcs12") && has("cert") {
            return Err(CredentialError::conflict("pkcs12", "cert"));
        }
        if has("pkcs12") && has("key") {
            return Err(CredentialError::conflict("pkcs12", "key"));
        }

        let engine = string_option(field, map, "engine")?;
        let pkcs12 = string_option(field, map, "pkcs12")?;
        let cert = string_option(field, map, "cert")?;
        let key = string_option(field, map, "key")?;
        let password = password_option(field, map)?;

        if let Some(engine) = engine {
            let key_name = string_option(field, map, "key_name")?
                .ok_or_else(|| CredentialError::companion("engine", "key_name"))?;
            let cert = cert.ok_or_else(|| CredentialError::companion("engine", "cert"))?;
            return Ok(Some(CredentialSource::Engine { engine, key_name, cert }));
        }

        if let Some(path) = pkcs12 {
            return Ok(Some(CredentialSource::Pkcs12 { path, password }));
        }

        match (cert, key) {
            (Some(cert), Some(key)) => Ok(Some(CredentialSource::KeyFile { cert, key, password })),
            (Some(cert), None) => Ok(Some(CredentialSource::CertOnly { cert })),
            (None, key) => {
                if key.is_some() {
                    warn!("{} 只给出了 key 而没有 cert，忽略该凭据", field);
                }
                Ok(None)
            }
        }
    }

    /// 来源种类名
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::Engine { .. } => "engine",
            CredentialSource::Pkcs12 { .. } => "pkcs12",
            CredentialSource::KeyFile { .. } => "key",
            CredentialSource::CertOnly { .. } => "cert",
        }
    }

    /// 按来源加载凭据
    pub fn load(&self, root: &RootPath, engines: &EngineRegistry) -> Result<Credential, CredentialError> {
        info!("加载凭据，来源: {}", self.kind());

        match self {
            CredentialSource::Engine { engine, key_name, cert } => {
                let key = engines.get(engine)?.load_private_key(key_name)?;
                let certificate = Certificate::from_pem(root.read(cert)?)?;
                Credential::new(certificate, key)
            }
            CredentialSource::Pkcs12 { path, password } => {
                let data = root.read(path)?;
                load_pkcs12(&data, password.as_deref(), path)
            }
            CredentialSource::KeyFile { cert, key, password } => {
                let certificate = Certificate::from_pem(root.read(cert)?)?;
                let private_key = PrivateKey::from_pem(root.read(key)?, password.as_deref())?
                    .with_origin(KeyOrigin::File(key.clone()));
                Credential::new(certificate, private_key)
            }
            CredentialSource::CertOnly { cert } => {
                let certificate = Certificate::from_pem(root.read(cert)?)?;
                Ok(Credential::certificate_only(certificate))
            }
        }
    }

    /// 导出为凭据声明
    pub fn to_document(&self) -> Value {
        fn put(map: &mut Mapping, key: &str, value: &str) {
            map.insert(Value::from(key), Value::from(value));
        }

        let mut map = Mapping::new();
        match self {
            CredentialSource::Engine { engine, key_name, cert } => {
                put(&mut map, "engine", engine);
                put(&mut map, "key_name", key_name);
                put(&mut map, "cert", cert);
            }
            CredentialSource::Pkcs12 { path, password } => {
                put(&mut map, "pkcs12", path);
                if let Some(password) = password {
                    put(&mut map, "password", password);
                }
            }
            CredentialSource::KeyFile { cert, key, password } => {
                put(&mut map, "cert", cert);
                put(&mut map, "key", key);
                if let Some(password) = password {
                    put(&mut map, "password", password);
                }
            }
            CredentialSource::CertOnly { cert } => put(&mut map, "cert", cert),
        }
        Value::Mapping(map)
    }
}

/// 解析并加载凭据声明
///
/// 声明中没有任何来源标记时返回 `Ok(None)`。
pub fn load_credential(
    field: &str,
    declaration: &Value,
    root: &RootPath,
    engines: &EngineRegistry,
) -> Result<Option<Credential>, CredentialError> {
    match CredentialSource::resolve(field, declaration)? {
        Some(source) => source.load(root, engines).map(Some),
        None => Ok(None),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "空值",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Sequence(_) => "序列",
        Value::Mapping(_) => "映射",
        Value::Tagged(_) => "带标签的值",
    }
}

fn string_option(field: &str, map: &Mapping, key: &str) -> Result<Option<String>, CredentialError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CredentialError::InvalidArgumentShape {
            field: format!("{}.{}", field, key),
            expected: "字符串".to_string(),
            actual: kind_of(other).to_string(),
        }),
    }
}

// YAML 中纯数字密码会被解析为数字
fn password_option(field: &str, map: &Mapping) -> Result<Option<String>, CredentialError> {
    match map.get("password") {
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        _ => string_option(field, map, "password"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(yaml: &str) -> Result<Option<CredentialSource>, CredentialError> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        CredentialSource::resolve("ca_cert", &value)
    }

    // 测试各来源的识别
    #[test]
    fn test_resolve_sources() {
        assert_eq!(
            resolve("engine: softhsm\nkey_name: ca\ncert: ca.pem").unwrap(),
            Some(CredentialSource::Engine {
                engine: "softhsm".to_string(),
                key_name: "ca".to_string(),
                cert: "ca.pem".to_string(),
            })
        );
        assert_eq!(
            resolve("pkcs12: ca.p12\npassword: 1234").unwrap(),
            Some(CredentialSource::Pkcs12 {
                path: "ca.p12".to_string(),
                password: Some("1234".to_string()),
            })
        );
        assert_eq!(
            resolve("cert: ca.pem\nkey: ca.key").unwrap(),
            Some(CredentialSource::KeyFile {
                cert: "ca.pem".to_string(),
                key: "ca.key".to_string(),
                password: None,
            })
        );
        assert_eq!(
            resolve("cert: ca.pem").unwrap(),
            Some(CredentialSource::CertOnly { cert: "ca.pem".to_string() })
        );
        assert_eq!(resolve("{}").unwrap(), None);
        assert_eq!(resolve("key: ca.key").unwrap(), None);
    }

    // 测试互斥来源
    #[test]
    fn test_conflicting_sources() {
        assert_eq!(
            resolve("engine: e\nkey_name: k\ncert: c\npkcs12: x.p12").unwrap_err(),
            CredentialError::conflict("engine", "pkcs12")
        );
        assert_eq!(
            resolve("engine: e\nkey_name: k\ncert: c\nkey: k.pem").unwrap_err(),
            CredentialError::conflict("engine", "key")
        );
        assert_eq!(
            resolve("pkcs12: x.p12\ncert: c.pem").unwrap_err(),
            CredentialError::conflict("pkcs12", "cert")
        );
        assert_eq!(
            resolve("pkcs12: x.p12\nkey: k.pem").unwrap_err(),
            CredentialError::conflict("pkcs12", "key")
        );
    }

    // 测试互斥判断先于取值类型检查
    #[test]
    fn test_conflict_reported_before_shape_errors() {
        assert_eq!(
            resolve("engine: e\npkcs12: x.p12\ncert: [a]").unwrap_err(),
            CredentialError::conflict("engine", "pkcs12")
        );
        assert_eq!(
            resolve("pkcs12: x.p12\nkey: k.pem\npassword: [p]").unwrap_err(),
            CredentialError::conflict("pkcs12", "key")
        );
        assert_eq!(
            resolve("engine: {id: e}\nkey: k.pem").unwrap_err(),
            CredentialError::conflict("engine", "key")
        );
    }

    // 测试引擎缺少配套选项
    #[test]
    fn test_engine_requires_companions() {
        assert_eq!(
            resolve("engine: e\ncert: c.pem").unwrap_err(),
            CredentialError::companion("engine", "key_name")
        );
        assert_eq!(
            resolve("engine: e\nkey_name: k").unwrap_err(),
            CredentialError::companion("engine", "cert")
        );
    }

    // 测试结构错误
    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(resolve("ca.pem"), Err(CredentialError::InvalidArgumentShape { .. })));
        assert!(matches!(resolve("cert: [a, b]"), Err(CredentialError::InvalidArgumentShape { .. })));
    }

    // 测试导出后可重新解析
    #[test]
    fn test_to_document_resolves_back() {
        let source = CredentialSource::KeyFile {
            cert: "ca.pem".to_string(),
            key: "ca.key".to_string(),
            password: Some("pw".to_string()),
        };
        assert_eq!(
            CredentialSource::resolve("ca_cert", &source.to_document()).unwrap(),
            Some(source)
        );
    }
}
