//! # 证书
//!
//! 以 DER 形式持有 X.509 证书，构造时完成解析，之后只读。

use crate::error::CredentialError;
use sha2::{Digest, Sha256};
use std::fmt;
use x509_parser::parse_x509_certificate;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// 已解析的 X.509 证书
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    serial: String,
    public_key: Vec<u8>,
    is_ca: bool,
}

impl Certificate {
    /// 从 DER 编码构造
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CredentialError> {
        let der = der.into();
        let (subject, issuer, serial, public_key, is_ca) = {
            let (rest, cert) = parse_x509_certificate(&der)
                .map_err(|e| CredentialError::InvalidCertificate(format!("DER 解析失败: {}", e)))?;
            if !rest.is_empty() {
                return Err(CredentialError::InvalidCertificate(format!(
                    "证书之后存在 {} 字节多余数据",
                    rest.len()
                )));
            }

            let is_ca = cert
                .basic_constraints()
                .ok()
                .flatten()
                .map(|ext| ext.value.ca)
                .unwrap_or(false);

            (
                cert.subject().to_string(),
                cert.issuer().to_string(),
                cert.raw_serial_as_string(),
                cert.public_key().subject_public_key.data.to_vec(),
                is_ca,
            )
        };

        Ok(Self {
            der,
            subject,
            issuer,
            serial,
            public_key,
            is_ca,
        })
    }

    /// 从 PEM 文本读取第一张证书
    pub fn from_pem(pem_data: impl AsRef<[u8]>) -> Result<Self, CredentialError> {
        Self::chain_from_pem(pem_data)?
            .into_iter()
            .next()
            .ok_or_else(|| CredentialError::InvalidCertificate("PEM 中没有证书".to_string()))
    }

    /// 读取 PEM 文本中的全部证书，保持文件中的顺序
    ///
    /// 非证书块（例如同文件中的私钥）被跳过。
    pub fn chain_from_pem(pem_data: impl AsRef<[u8]>) -> Result<Vec<Self>, CredentialError> {
        let blocks = pem::parse_many(pem_data)
            .map_err(|e| CredentialError::InvalidCertificate(format!("PEM 解析失败: {}", e)))?;

        let chain = blocks
            .iter()
            .filter(|block| block.tag() == CERTIFICATE_TAG)
            .map(|block| Self::from_der(block.contents()))
            .collect::<Result<Vec<_>, _>>()?;

        if chain.is_empty() {
            return Err(CredentialError::InvalidCertificate("PEM 中没有证书".to_string()));
        }
        Ok(chain)
    }

    /// DER 编码
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// 主题名称（RFC 4514 形式）
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// 颁发者名称
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// 序列号（冒号分隔的十六进制）
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// 主题公钥的原始字节
    pub fn public_key_raw(&self) -> &[u8] {
        &self.public_key
    }

    /// 基本约束中是否标记为CA
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// 主题与颁发者相同
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }

    /// DER 编码的 SHA-256 指纹（小写十六进制）
    pub fn fingerprint(&self) -> String {
        format!("{:x}", Sha256::digest(&self.der))
    }

    /// PEM 编码
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new(CERTIFICATE_TAG, self.der.clone()))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("serial", &self.serial)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}
