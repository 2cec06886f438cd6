//! # CA 配置
//!
//! 单个证书颁发机构的完整配置：签名凭据、OCSP 响应参数、CRL 时间参数与签发模板集合。
//! 构造后只允许通过 [`CaConfig::set_profile`] 增加或覆盖签发模板。

use crate::error::CaConfigError;
use caconf_credential::{Certificate, Credential, CredentialSource};
use caconf_policy::CertProfile;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CRL 默认有效期（小时）
pub const DEFAULT_CRL_VALIDITY_HOURS: u64 = 168;

/// CRL 生效时间默认提前量（秒）
pub const DEFAULT_CRL_START_SKEW_SECONDS: u64 = 3600;

/// OCSP 响应默认有效期（小时）
pub const DEFAULT_OCSP_VALIDITY_HOURS: u64 = 168;

/// OCSP 响应生效时间默认提前量（秒）
pub const DEFAULT_OCSP_START_SKEW_SECONDS: u64 = 3600;

/// 加载时文档中的凭据与路径声明，导出文档时原样写回
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DeclaredSources {
    pub(crate) ca_cert: Option<CredentialSource>,
    pub(crate) ocsp_cert: Option<CredentialSource>,
    pub(crate) ocsp_chain: Option<String>,
    pub(crate) crl_number: Option<String>,
    pub(crate) crl_list: Option<String>,
}

/// 证书颁发机构配置
#[derive(Debug, Clone)]
pub struct CaConfig {
    ca_cert: Credential,
    ocsp_cert: Option<Credential>,
    ocsp_chain: Vec<Certificate>,
    crl_validity_hours: u64,
    crl_start_skew_seconds: u64,
    ocsp_validity_hours: u64,
    ocsp_start_skew_seconds: u64,
    crl_number_file: Option<PathBuf>,
    crl_list_file: Option<PathBuf>,
    profiles: HashMap<String, CertProfile>,
    pub(crate) sources: DeclaredSources,
}

impl CaConfig {
    /// 创建配置构建器
    pub fn builder() -> CaConfigBuilder {
        CaConfigBuilder::default()
    }

    /// CA 签名凭据
    pub fn ca_cert(&self) -> &Credential {
        &self.ca_cert
    }

    /// OCSP 响应签名凭据
    ///
    /// 未单独配置时返回 CA 签名凭据。
    pub fn ocsp_cert(&self) -> &Credential {
        self.ocsp_cert.as_ref().unwrap_or(&self.ca_cert)
    }

    /// 是否单独配置了 OCSP 签名凭据
    pub fn has_delegated_ocsp_cert(&self) -> bool {
        self.ocsp_cert.is_some()
    }

    /// 随 OCSP 响应附带的证书链
    pub fn ocsp_chain(&self) -> &[Certificate] {
        &self.ocsp_chain
    }

    pub fn crl_validity_hours(&self) -> u64 {
        self.crl_validity_hours
    }

    pub fn crl_start_skew_seconds(&self) -> u64 {
        self.crl_start_skew_seconds
    }

    pub fn ocsp_validity_hours(&self) -> u64 {
        self.ocsp_validity_hours
    }

    pub fn ocsp_start_skew_seconds(&self) -> u64 {
        self.ocsp_start_skew_seconds
    }

    /// CRL 编号持久化文件
    pub fn crl_number_file(&self) -> Option<&Path> {
        self.crl_number_file.as_deref()
    }

    /// 吊销列表持久化文件
    pub fn crl_list_file(&self) -> Option<&Path> {
        self.crl_list_file.as_deref()
    }

    /// 按名称查找签发模板
    pub fn profile(&self, name: &str) -> Result<&CertProfile, CaConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| CaConfigError::UnknownProfile(name.to_string()))
    }

    /// 注册签发模板，同名模板被覆盖
    pub fn set_profile(&mut self, name: impl Into<String>, profile: CertProfile) {
        let name = name.into();
        if self.profiles.insert(name.clone(), profile).is_some() {
            info!("覆盖签发模板: {}", name);
        } else {
            debug!("注册签发模板: {}", name);
        }
    }

    /// 已注册的签发模板数量
    pub fn num_profiles(&self) -> usize {
        self.profiles.len()
    }

    /// 已注册的签发模板名称，按字典序
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 配置概要
    pub fn summary(&self) -> CaConfigSummary {
        let ca = self.ca_cert.certificate();
        let ocsp = self.ocsp_cert();

        CaConfigSummary {
            subject: ca.subject().to_string(),
            fingerprint: ca.fingerprint(),
            can_sign: self.ca_cert.has_private_key(),
            ocsp_subject: ocsp.certificate().subject().to_string(),
            ocsp_can_sign: ocsp.has_private_key(),
            ocsp_delegated: self.has_delegated_ocsp_cert(),
            ocsp_chain_length: self.ocsp_chain.len(),
            crl_validity_hours: self.crl_validity_hours,
            crl_start_skew_seconds: self.crl_start_skew_seconds,
            ocsp_validity_hours: self.ocsp_validity_hours,
            ocsp_start_skew_seconds: self.ocsp_start_skew_seconds,
            crl_number_file: self.crl_number_file.as_ref().map(|p| p.display().to_string()),
            crl_list_file: self.crl_list_file.as_ref().map(|p| p.display().to_string()),
            profiles: self.profile_names().into_iter().map(str::to_string).collect(),
        }
    }
}

/// 可序列化的配置概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaConfigSummary {
    pub subject: String,
    pub fingerprint: String,
    pub can_sign: bool,
    pub ocsp_subject: String,
    pub ocsp_can_sign: bool,
    pub ocsp_delegated: bool,
    pub ocsp_chain_length: usize,
    pub crl_validity_hours: u64,
    pub crl_start_skew_seconds: u64,
    pub ocsp_validity_hours: u64,
    pub ocsp_start_skew_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_number_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crl_list_file: Option<String>,
    pub profiles: Vec<String>,
}

/// CA 配置构建器
///
/// 文档加载与手工构造走同一个 [`CaConfigBuilder::build`]。
#[derive(Debug, Clone, Default)]
pub struct CaConfigBuilder {
    ca_cert: Option<Credential>,
    ocsp_cert: Option<Credential>,
    ocsp_chain: Vec<Certificate>,
    crl_validity_hours: Option<u64>,
    crl_start_skew_seconds: Option<u64>,
    ocsp_validity_hours: Option<u64>,
    ocsp_start_skew_seconds: Option<u64>,
    crl_number_file: Option<PathBuf>,
    crl_list_file: Option<PathBuf>,
    profiles: Vec<(String, CertProfile)>,
    sources: DeclaredSources,
}

impl CaConfigBuilder {
    /// 设置 CA 签名凭据（必需）
    pub fn with_ca_cert(mut self, credential: Credential) -> Self {
        self.ca_cert = Some(credential);
        self
    }

    /// 设置 OCSP 签名凭据，必须带私钥
    pub fn with_ocsp_cert(mut self, credential: Credential) -> Self {
        self.ocsp_cert = Some(credential);
        self
    }

    pub fn with_ocsp_chain(mut self, chain: Vec<Certificate>) -> Self {
        self.ocsp_chain = chain;
        self
    }

    pub fn with_crl_validity_hours(mut self, hours: u64) -> Self {
        self.crl_validity_hours = Some(hours);
        self
    }

    pub fn with_crl_start_skew_seconds(mut self, seconds: u64) -> Self {
        self.crl_start_skew_seconds = Some(seconds);
        self
    }

    pub fn with_ocsp_validity_hours(mut self, hours: u64) -> Self {
        self.ocsp_validity_hours = Some(hours);
        self
    }

    pub fn with_ocsp_start_skew_seconds(mut self, seconds: u64) -> Self {
        self.ocsp_start_skew_seconds = Some(seconds);
        self
    }

    pub fn with_crl_number_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.crl_number_file = Some(path.into());
        self
    }

    pub fn with_crl_list_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.crl_list_file = Some(path.into());
        self
    }

    /// 添加签发模板，构造时按添加顺序注册
    pub fn with_profile(mut self, name: impl Into<String>, profile: CertProfile) -> Self {
        self.profiles.push((name.into(), profile));
        self
    }

    pub(crate) fn with_sources(mut self, sources: DeclaredSources) -> Self {
        self.sources = sources;
        self
    }

    /// 构造配置
    pub fn build(self) -> Result<CaConfig, CaConfigError> {
        let ca_cert = self
            .ca_cert
            .ok_or_else(|| CaConfigError::MissingRequiredOption("ca_cert".to_string()))?;

        if let Some(ocsp) = &self.ocsp_cert {
            if !ocsp.has_private_key() {
                return Err(CaConfigError::option_type(
                    "ocsp_cert",
                    "带私钥的凭据",
                    format!("只有证书的凭据 ({})", ocsp.certificate().subject()),
                ));
            }
        }

        let mut config = CaConfig {
            ca_cert,
            ocsp_cert: self.ocsp_cert,
            ocsp_chain: self.ocsp_chain,
            crl_validity_hours: self.crl_validity_hours.unwrap_or(DEFAULT_CRL_VALIDITY_HOURS),
            crl_start_skew_seconds: self.crl_start_skew_seconds.unwrap_or(DEFAULT_CRL_START_SKEW_SECONDS),
            ocsp_validity_hours: self.ocsp_validity_hours.unwrap_or(DEFAULT_OCSP_VALIDITY_HOURS),
            ocsp_start_skew_seconds: self.ocsp_start_skew_seconds.unwrap_or(DEFAULT_OCSP_START_SKEW_SECONDS),
            crl_number_file: self.crl_number_file,
            crl_list_file: self.crl_list_file,
            profiles: HashMap::new(),
            sources: self.sources,
        };

        for (name, profile) in self.profiles {
            config.set_profile(name, profile);
        }

        debug!(
            "CA 配置构造完成: {}，签发模板 {} 个",
            config.ca_cert.certificate().subject(),
            config.num_profiles()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caconf_credential::{KeyOrigin, PrivateKey};
    use rcgen::{CertificateParams, DnType, KeyPair};

    fn credential(common_name: &str, with_key: bool) -> Credential {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.distinguished_name.push(DnType::CommonName, common_name);
        let cert = Certificate::from_pem(params.self_signed(&key).unwrap().pem()).unwrap();

        if with_key {
            Credential::new(cert, PrivateKey::new(key, KeyOrigin::Memory)).unwrap()
        } else {
            Credential::certificate_only(cert)
        }
    }

    // 测试缺少签名凭据
    #[test]
    fn test_build_requires_ca_cert() {
        assert_eq!(
            CaConfig::builder().build().unwrap_err(),
            CaConfigError::MissingRequiredOption("ca_cert".to_string())
        );
    }

    // 测试默认数值
    #[test]
    fn test_numeric_defaults() {
        let config = CaConfig::builder().with_ca_cert(credential("CA", true)).build().unwrap();

        assert_eq!(config.crl_validity_hours(), 168);
        assert_eq!(config.crl_start_skew_seconds(), 3600);
        assert_eq!(config.ocsp_validity_hours(), 168);
        assert_eq!(config.ocsp_start_skew_seconds(), 3600);
        assert!(config.crl_number_file().is_none());
        assert!(config.ocsp_chain().is_empty());
    }

    // 测试 OCSP 凭据回退到 CA 凭据
    #[test]
    fn test_ocsp_cert_fallback() {
        let ca = credential("CA", true);
        let config = CaConfig::builder().with_ca_cert(ca.clone()).build().unwrap();
        assert_eq!(config.ocsp_cert().certificate(), ca.certificate());
        assert!(!config.has_delegated_ocsp_cert());

        let responder = credential("OCSP Responder", true);
        let config = CaConfig::builder()
            .with_ca_cert(ca)
            .with_ocsp_cert(responder.clone())
            .build()
            .unwrap();
        assert_eq!(config.ocsp_cert().certificate(), responder.certificate());
        assert!(config.has_delegated_ocsp_cert());
    }

    // 测试 OCSP 凭据必须能签名
    #[test]
    fn test_ocsp_cert_requires_private_key() {
        let result = CaConfig::builder()
            .with_ca_cert(credential("CA", true))
            .with_ocsp_cert(credential("OCSP", false))
            .build();
        assert!(matches!(result, Err(CaConfigError::InvalidOptionType { ref option, .. }) if option == "ocsp_cert"));
    }

    // 测试只有证书的 CA 凭据
    #[test]
    fn test_cert_only_ca_allowed() {
        let config = CaConfig::builder().with_ca_cert(credential("CA", false)).build().unwrap();
        assert!(!config.ca_cert().has_private_key());
        assert!(!config.summary().can_sign);
    }

    // 测试模板注册与覆盖
    #[test]
    fn test_profile_registration() {
        let server = CertProfile::builder().with_key_usage(["digitalSignature"]).build().unwrap();
        let client = CertProfile::builder().with_extended_key_usage(["clientAuth"]).build().unwrap();

        let mut config = CaConfig::builder()
            .with_ca_cert(credential("CA", true))
            .with_profile("server", server.clone())
            .build()
            .unwrap();
        assert_eq!(config.num_profiles(), 1);
        assert_eq!(config.profile("server").unwrap(), &server);
        assert_eq!(
            config.profile("client").unwrap_err(),
            CaConfigError::UnknownProfile("client".to_string())
        );

        config.set_profile("client", client.clone());
        config.set_profile("server", client.clone());
        assert_eq!(config.num_profiles(), 2);
        assert_eq!(config.profile("server").unwrap(), &client);
        assert_eq!(config.profile_names(), ["client", "server"]);
    }

    // 测试配置概要
    #[test]
    fn test_summary() {
        let config = CaConfig::builder()
            .with_ca_cert(credential("Summary CA", true))
            .with_crl_validity_hours(24)
            .with_crl_number_file("/var/lib/ca/crl_number")
            .build()
            .unwrap();
        let summary = config.summary();

        assert!(summary.subject.contains("Summary CA"));
        assert_eq!(summary.fingerprint.len(), 64);
        assert!(summary.can_sign && summary.ocsp_can_sign);
        assert!(!summary.ocsp_delegated);
        assert_eq!(summary.crl_validity_hours, 24);
        assert_eq!(summary.crl_number_file.as_deref(), Some("/var/lib/ca/crl_number"));
    }
}
