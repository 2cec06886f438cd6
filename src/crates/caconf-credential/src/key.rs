//! # 私钥
//!
//! 签名私钥统一由 rcgen 的 [`KeyPair`] 承载，来源信息单独记录，
//! 便于日志与导出时说明私钥出处而不暴露密钥材料。

use crate::certificate::Certificate;
use crate::error::CredentialError;
use pkcs8::EncryptedPrivateKeyInfo;
use rcgen::KeyPair;
use std::fmt;
use std::sync::Arc;

const PKCS8_TAG: &str = "PRIVATE KEY";
const ENCRYPTED_PKCS8_TAG: &str = "ENCRYPTED PRIVATE KEY";

/// 私钥来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    /// 内存中直接构造
    Memory,
    /// 独立私钥文件
    File(String),
    /// PKCS#12 文件
    Pkcs12(String),
    /// 密钥引擎
    Engine { engine: String, key_name: String },
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrigin::Memory => write!(f, "内存"),
            KeyOrigin::File(path) => write!(f, "文件 {}", path),
            KeyOrigin::Pkcs12(path) => write!(f, "PKCS#12 {}", path),
            KeyOrigin::Engine { engine, key_name } => write!(f, "引擎 {}:{}", engine, key_name),
        }
    }
}

/// 签名私钥
#[derive(Clone)]
pub struct PrivateKey {
    key_pair: Arc<KeyPair>,
    origin: KeyOrigin,
}

impl PrivateKey {
    /// 包装已有的密钥对
    pub fn new(key_pair: KeyPair, origin: KeyOrigin) -> Self {
        Self {
            key_pair: Arc::new(key_pair),
            origin,
        }
    }

    /// 从 PEM 文本加载
    ///
    /// 支持 `PRIVATE KEY` 与 `ENCRYPTED PRIVATE KEY`（PKCS#8）；
    /// 其他私钥块交给 rcgen 识别。加密私钥必须提供密码。
    pub fn from_pem(pem_data: impl AsRef<[u8]>, password: Option<&str>) -> Result<Self, CredentialError> {
        let blocks = pem::parse_many(pem_data)
            .map_err(|e| CredentialError::InvalidPrivateKey(format!("PEM 解析失败: {}", e)))?;

        let block = blocks
            .iter()
            .find(|block| block.tag().ends_with(PKCS8_TAG))
            .ok_or_else(|| CredentialError::InvalidPrivateKey("PEM 中没有私钥".to_string()))?;

        match block.tag() {
            ENCRYPTED_PKCS8_TAG => {
                let password = password.ok_or_else(|| CredentialError::companion("key", "password"))?;
                let info = EncryptedPrivateKeyInfo::try_from(block.contents())
                    .map_err(|e| CredentialError::InvalidPrivateKey(format!("加密私钥结构无效: {}", e)))?;
                let document = info
                    .decrypt(password)
                    .map_err(|e| CredentialError::InvalidPrivateKey(format!("私钥解密失败: {}", e)))?;
                Self::from_pkcs8_der(document.as_bytes())
            }
            PKCS8_TAG => Self::from_pkcs8_der(block.contents()),
            _ => {
                let key_pair = KeyPair::from_pem(&pem::encode(block))
                    .map_err(|e| CredentialError::InvalidPrivateKey(format!("不支持的私钥格式 {}: {}", block.tag(), e)))?;
                Ok(Self::new(key_pair, KeyOrigin::Memory))
            }
        }
    }

    /// 从未加密的 PKCS#8 DER 加载
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CredentialError> {
        let pem_text = pem::encode(&pem::Pem::new(PKCS8_TAG, der.to_vec()));
        let key_pair = KeyPair::from_pem(&pem_text)
            .map_err(|e| CredentialError::InvalidPrivateKey(format!("PKCS#8 解析失败: {}", e)))?;
        Ok(Self::new(key_pair, KeyOrigin::Memory))
    }

    /// 替换来源信息
    pub fn with_origin(mut self, origin: KeyOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// 底层密钥对
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// 公钥原始字节
    pub fn public_key_raw(&self) -> &[u8] {
        self.key_pair.public_key_raw()
    }

    /// 签名算法名称
    pub fn algorithm(&self) -> String {
        format!("{:?}", self.key_pair.algorithm())
    }

    pub fn origin(&self) -> &KeyOrigin {
        &self.origin
    }

    /// 公钥是否与证书一致
    pub fn matches(&self, certificate: &Certificate) -> bool {
        self.public_key_raw() == certificate.public_key_raw()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
