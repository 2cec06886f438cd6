//! # 密钥引擎
//!
//! 私钥不以文件形式给出时，由已注册的引擎按名称提供。
//! 硬件模块等实现只需实现 [`KeyEngine`] 并注册到 [`EngineRegistry`]。

use crate::error::CredentialError;
use crate::key::{KeyOrigin, PrivateKey};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 按名称提供私钥的引擎
pub trait KeyEngine: Debug + Send + Sync {
    /// 引擎标识，即配置文档中 `engine` 的取值
    fn id(&self) -> &str;

    /// 加载指定名称的私钥
    fn load_private_key(&self, key_name: &str) -> Result<PrivateKey, CredentialError>;
}

/// 引擎注册表
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn KeyEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册引擎，同名引擎被替换
    pub fn register(&mut self, engine: Arc<dyn KeyEngine>) {
        info!("注册密钥引擎: {}", engine.id());
        self.engines.insert(engine.id().to_string(), engine);
    }

    pub fn with_engine(mut self, engine: Arc<dyn KeyEngine>) -> Self {
        self.register(engine);
        self
    }

    /// 查找引擎
    pub fn get(&self, id: &str) -> Result<&Arc<dyn KeyEngine>, CredentialError> {
        self.engines
            .get(id)
            .ok_or_else(|| CredentialError::UnknownEngine(id.to_string()))
    }

    /// 已注册的引擎标识，按字典序
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

/// 目录引擎
///
/// 密钥名 `name` 对应目录下的 `name.pem`，文件内容为 PKCS#8 私钥。
#[derive(Debug, Clone)]
pub struct DirectoryEngine {
    id: String,
    directory: PathBuf,
    password: Option<String>,
}

impl DirectoryEngine {
    pub fn new(id: impl Into<String>, directory: impl AsRef<Path>) -> Self {
        Self {
            id: id.into(),
            directory: directory.as_ref().to_path_buf(),
            password: None,
        }
    }

    /// 目录中的私钥统一使用该密码加密
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn failure(&self, key_name: &str, reason: impl Into<String>) -> CredentialError {
        CredentialError::EngineFailure {
            engine: self.id.clone(),
            key_name: key_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl KeyEngine for DirectoryEngine {
    fn id(&self) -> &str {
        &self.id
    }

    fn load_private_key(&self, key_name: &str) -> Result<PrivateKey, CredentialError> {
        if key_name.is_empty() || key_name.contains(['/', '\\']) || key_name.starts_with('.') {
            return Err(self.failure(key_name, "密钥名不能包含路径"));
        }

        let path = self.directory.join(format!("{}.pem", key_name));
        debug!("目录引擎 {} 读取 {}", self.id, path.display());

        let pem_data = fs::read(&path).map_err(|e| self.failure(key_name, format!("{}: {}", path.display(), e)))?;
        let key = PrivateKey::from_pem(pem_data, self.password.as_deref())
            .map_err(|e| self.failure(key_name, e.to_string()))?;

        Ok(key.with_origin(KeyOrigin::Engine {
            engine: self.id.clone(),
            key_name: key_name.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::KeyPair;

    // 测试目录引擎按名称加载
    #[test]
    fn test_directory_engine_loads_named_key() {
        let dir = tempfile::tempdir().unwrap();
        let key = KeyPair::generate().unwrap();
        fs::write(dir.path().join("ca-signing.pem"), key.serialize_pem()).unwrap();

        let engine = DirectoryEngine::new("softhsm", dir.path());
        let loaded = engine.load_private_key("ca-signing").unwrap();

        assert_eq!(loaded.public_key_raw(), key.public_key_raw());
        assert_eq!(
            loaded.origin(),
            &KeyOrigin::Engine {
                engine: "softhsm".to_string(),
                key_name: "ca-signing".to_string(),
            }
        );
    }

    // 测试缺失的密钥与非法密钥名
    #[test]
    fn test_directory_engine_failures() {
        let dir = tempfile::tempdir().unwrap();
        let engine = DirectoryEngine::new("softhsm", dir.path());

        assert!(matches!(
            engine.load_private_key("missing"),
            Err(CredentialError::EngineFailure { .. })
        ));
        assert!(matches!(
            engine.load_private_key("../etc/passwd"),
            Err(CredentialError::EngineFailure { .. })
        ));
    }

    // 测试注册表查找
    #[test]
    fn test_registry_lookup() {
        let registry = EngineRegistry::new()
            .with_engine(Arc::new(DirectoryEngine::new("b", ".")))
            .with_engine(Arc::new(DirectoryEngine::new("a", ".")));

        assert_eq!(registry.ids(), ["a", "b"]);
        assert_eq!(registry.get("a").unwrap().id(), "a");
        assert_eq!(
            registry.get("pkcs11").unwrap_err(),
            CredentialError::UnknownEngine("pkcs11".to_string())
        );
    }
}
