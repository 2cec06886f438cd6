//! # 凭据
//!
//! 证书加上可选的私钥。只有证书的凭据可以用于发布信息，不能签名。

use crate::certificate::Certificate;
use crate::error::CredentialError;
use crate::key::PrivateKey;
use tracing::debug;

/// 证书与可选私钥
#[derive(Debug, Clone)]
pub struct Credential {
    certificate: Certificate,
    private_key: Option<PrivateKey>,
}

impl Credential {
    /// 构造带私钥的凭据，私钥必须与证书公钥一致
    pub fn new(certificate: Certificate, private_key: PrivateKey) -> Result<Self, CredentialError> {
        if !private_key.matches(&certificate) {
            return Err(CredentialError::KeyMismatch(format!(
                "{} 的公钥与来自{}的私钥不一致",
                certificate.subject(),
                private_key.origin()
            )));
        }

        debug!("凭据已就绪: {} ({})", certificate.subject(), certificate.fingerprint());
        Ok(Self {
            certificate,
            private_key: Some(private_key),
        })
    }

    /// 只有证书的凭据
    pub fn certificate_only(certificate: Certificate) -> Self {
        Self {
            certificate,
            private_key: None,
        }
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// 是否持有私钥（即能否用于签名）
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }
}
