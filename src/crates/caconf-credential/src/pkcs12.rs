//! # PKCS#12
//!
//! 从单个 PKCS#12 文件同时取出证书和私钥。

use crate::certificate::Certificate;
use crate::credential::Credential;
use crate::error::CredentialError;
use crate::key::{KeyOrigin, PrivateKey};
use p12::PFX;
use tracing::debug;

/// 解析 PKCS#12 数据
///
/// 文件中可能附带CA链；与私钥匹配的证书作为凭据证书。
/// 未给出密码时按空密码处理。
pub fn load_pkcs12(data: &[u8], password: Option<&str>, source: &str) -> Result<Credential, CredentialError> {
    let password = password.unwrap_or("");
    let pfx = PFX::parse(data).map_err(|e| CredentialError::InvalidPkcs12(format!("{}: {:?}", source, e)))?;

    if !pfx.verify_mac(password) {
        return Err(CredentialError::InvalidPkcs12(format!("{}: MAC 校验失败，密码可能不正确", source)));
    }

    let key_der = pfx
        .key_bags(password)
        .map_err(|e| CredentialError::InvalidPkcs12(format!("{}: 读取私钥失败: {:?}", source, e)))?
        .into_iter()
        .next()
        .ok_or_else(|| CredentialError::InvalidPkcs12(format!("{}: 不含私钥", source)))?;
    let key = PrivateKey::from_pkcs8_der(&key_der)?.with_origin(KeyOrigin::Pkcs12(source.to_string()));

    let certificates = pfx
        .cert_x509_bags(password)
        .map_err(|e| CredentialError::InvalidPkcs12(format!("{}: 读取证书失败: {:?}", source, e)))?
        .into_iter()
        .map(Certificate::from_der)
        .collect::<Result<Vec<_>, _>>()?;

    if certificates.is_empty() {
        return Err(CredentialError::InvalidPkcs12(format!("{}: 不含证书", source)));
    }
    debug!("{} 含 {} 张证书", source, certificates.len());

    let certificate = certificates
        .into_iter()
        .find(|cert| key.matches(cert))
        .ok_or_else(|| CredentialError::KeyMismatch(format!("{} 中没有与私钥匹配的证书", source)))?;

    Credential::new(certificate, key)
}
