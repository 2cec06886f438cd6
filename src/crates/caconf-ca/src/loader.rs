//! # 配置文档加载
//!
//! 从 YAML 文档构造 [`CaConfig`]。文档中的相对路径按 [`LoadOptions`] 指定的根目录解析，
//! 私钥引擎与模板字段校验规则同样由 [`LoadOptions`] 提供。

use crate::config::{
    CaConfig, DeclaredSources, DEFAULT_CRL_START_SKEW_SECONDS, DEFAULT_CRL_VALIDITY_HOURS,
    DEFAULT_OCSP_START_SKEW_SECONDS, DEFAULT_OCSP_VALIDITY_HOURS,
};
use crate::error::CaConfigError;
use caconf_credential::{Certificate, CredentialSource, EngineRegistry, KeyEngine, RootPath};
use caconf_policy::value::{get, kind_of};
use caconf_policy::{CertProfile, FieldValidators, StandardValidators};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CA 配置在文档中可用的键
pub const CA_CONFIG_KEYS: [&str; 12] = [
    "ca_cert",
    "ocsp_cert",
    "ocsp_chain",
    "crl_validity_hours",
    "crl_start_skew_seconds",
    "ocsp_validity_hours",
    "ocsp_start_skew_seconds",
    "crl_number",
    "crl_number_file",
    "crl_list",
    "crl_list_file",
    "profiles",
];

/// 文档加载选项
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// 相对路径的根目录，默认为当前工作目录
    pub root_path: Option<PathBuf>,

    /// 可用的密钥引擎
    pub engines: EngineRegistry,

    /// 签发模板字段校验规则
    pub validators: Arc<dyn FieldValidators>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            root_path: None,
            engines: EngineRegistry::new(),
            validators: Arc::new(StandardValidators),
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = Some(root_path.into());
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn KeyEngine>) -> Self {
        self.engines.register(engine);
        self
    }

    pub fn with_validators(mut self, validators: Arc<dyn FieldValidators>) -> Self {
        self.validators = validators;
        self
    }

    /// 校验并返回根目录
    pub fn root(&self) -> Result<RootPath, CaConfigError> {
        let root = match &self.root_path {
            Some(path) => RootPath::new(path),
            None => RootPath::current_dir(),
        };
        root.map_err(CaConfigError::credential("root_path"))
    }
}

impl CaConfig {
    /// 从 YAML 文本中名为 `name` 的顶层条目加载
    pub fn from_yaml(name: &str, yaml: &str, options: &LoadOptions) -> Result<Self, CaConfigError> {
        let document = parse_document(yaml)?;
        Self::from_value(top_level_entry(&document, name)?, options)
    }

    /// 从 YAML 文件中名为 `name` 的顶层条目加载
    pub fn from_yaml_file(name: &str, path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, CaConfigError> {
        Self::from_yaml(name, &read_document(path.as_ref())?, options)
    }

    /// 从单个 CA 的配置映射加载
    pub fn from_value(data: &Value, options: &LoadOptions) -> Result<Self, CaConfigError> {
        let root = options.root()?;
        load_ca(data, &root, options)
    }

    /// 导出为配置映射
    ///
    /// 凭据按加载时的声明写回；通过构建器构造且未记录声明的凭据不导出。
    pub fn to_document(&self) -> Result<Value, CaConfigError> {
        let mut map = Mapping::new();

        if let Some(source) = &self.sources.ca_cert {
            map.insert(Value::from("ca_cert"), source.to_document());
        }
        if let Some(source) = &self.sources.ocsp_cert {
            map.insert(Value::from("ocsp_cert"), source.to_document());
        }
        if let Some(chain) = &self.sources.ocsp_chain {
            map.insert(Value::from("ocsp_chain"), Value::from(chain.as_str()));
        }

        map.insert(Value::from("crl_validity_hours"), Value::from(self.crl_validity_hours()));
        map.insert(Value::from("crl_start_skew_seconds"), Value::from(self.crl_start_skew_seconds()));
        map.insert(Value::from("ocsp_validity_hours"), Value::from(self.ocsp_validity_hours()));
        map.insert(Value::from("ocsp_start_skew_seconds"), Value::from(self.ocsp_start_skew_seconds()));

        // 写回声明中的原始路径，重新加载时再按根目录解析
        let crl_number = self.sources.crl_number.clone()
            .or_else(|| self.crl_number_file().map(|path| path.display().to_string()));
        if let Some(path) = crl_number {
            map.insert(Value::from("crl_number"), Value::from(path));
        }
        let crl_list = self.sources.crl_list.clone()
            .or_else(|| self.crl_list_file().map(|path| path.display().to_string()));
        if let Some(path) = crl_list {
            map.insert(Value::from("crl_list"), Value::from(path));
        }

        let mut profiles = Mapping::new();
        for name in self.profile_names() {
            let profile = self.profile(name)?;
            let document = profile.to_document().map_err(|source| CaConfigError::Profile {
                name: name.to_string(),
                source,
            })?;
            profiles.insert(Value::from(name), document);
        }
        if !profiles.is_empty() {
            map.insert(Value::from("profiles"), Value::Mapping(profiles));
        }

        Ok(Value::Mapping(map))
    }

    /// 导出为 YAML 文本
    pub fn to_yaml(&self) -> Result<String, CaConfigError> {
        serde_yaml::to_string(&self.to_document()?).map_err(|e| CaConfigError::Document(e.to_string()))
    }
}

pub(crate) fn parse_document(yaml: &str) -> Result<Value, CaConfigError> {
    let document: Value = serde_yaml::from_str(yaml).map_err(|e| CaConfigError::Document(e.to_string()))?;
    debug!("配置文档解析完成");
    Ok(document)
}

pub(crate) fn read_document(path: &Path) -> Result<String, CaConfigError> {
    info!("读取配置文档: {}", path.display());
    fs::read_to_string(path).map_err(|e| CaConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// 查找顶层条目，文档本身必须是映射
pub(crate) fn top_level_entry<'a>(document: &'a Value, name: &str) -> Result<&'a Value, CaConfigError> {
    let map = document.as_mapping().ok_or_else(|| CaConfigError::InvalidArgumentShape {
        field: "document".to_string(),
        expected: "映射".to_string(),
        actual: kind_of(document).to_string(),
    })?;
    get(map, name).ok_or_else(|| CaConfigError::MissingRequiredOption(name.to_string()))
}

/// 按已校验的根目录加载单个 CA
pub(crate) fn load_ca(data: &Value, root: &RootPath, options: &LoadOptions) -> Result<CaConfig, CaConfigError> {
    let data = data.as_mapping().ok_or_else(|| CaConfigError::InvalidArgumentShape {
        field: "ca".to_string(),
        expected: "映射".to_string(),
        actual: kind_of(data).to_string(),
    })?;

    for key in data.keys() {
        match key.as_str() {
            Some(name) if CA_CONFIG_KEYS.contains(&name) => {}
            Some(name) => warn!("忽略CA配置中未知的键: {}", name),
            None => warn!("忽略CA配置中的非字符串键"),
        }
    }

    let mut sources = DeclaredSources::default();
    let mut builder = CaConfig::builder();

    let ca_declaration = get(data, "ca_cert").ok_or_else(|| CaConfigError::MissingRequiredOption("ca_cert".to_string()))?;
    let ca_source = credential_source("ca_cert", ca_declaration)?
        .ok_or_else(|| CaConfigError::MissingRequiredOption("ca_cert".to_string()))?;
    let ca_cert = ca_source
        .load(root, &options.engines)
        .map_err(CaConfigError::credential("ca_cert"))?;
    info!("CA 签名凭据: {} (来源 {})", ca_cert.certificate().subject(), ca_source.kind());
    builder = builder.with_ca_cert(ca_cert);
    sources.ca_cert = Some(ca_source);

    if let Some(declaration) = get(data, "ocsp_cert") {
        match credential_source("ocsp_cert", declaration)? {
            Some(source) => {
                let credential = source
                    .load(root, &options.engines)
                    .map_err(CaConfigError::credential("ocsp_cert"))?;
                info!("OCSP 签名凭据: {} (来源 {})", credential.certificate().subject(), source.kind());
                builder = builder.with_ocsp_cert(credential);
                sources.ocsp_cert = Some(source);
            }
            None => warn!("ocsp_cert 中没有凭据来源，使用 CA 签名凭据"),
        }
    }

    if let Some(chain_path) = string_option(data, "ocsp_chain")? {
        let pem_data = root.read(&chain_path).map_err(CaConfigError::credential("ocsp_chain"))?;
        let chain = Certificate::chain_from_pem(pem_data).map_err(CaConfigError::credential("ocsp_chain"))?;
        debug!("OCSP 证书链 {} 张", chain.len());
        builder = builder.with_ocsp_chain(chain);
        sources.ocsp_chain = Some(chain_path);
    }

    builder = builder
        .with_crl_validity_hours(number_option(data, "crl_validity_hours")?.unwrap_or(DEFAULT_CRL_VALIDITY_HOURS))
        .with_crl_start_skew_seconds(
            number_option(data, "crl_start_skew_seconds")?.unwrap_or(DEFAULT_CRL_START_SKEW_SECONDS),
        )
        .with_ocsp_validity_hours(number_option(data, "ocsp_validity_hours")?.unwrap_or(DEFAULT_OCSP_VALIDITY_HOURS))
        .with_ocsp_start_skew_seconds(
            number_option(data, "ocsp_start_skew_seconds")?.unwrap_or(DEFAULT_OCSP_START_SKEW_SECONDS),
        );

    if let Some(path) = path_option(data, "crl_number", "crl_number_file")? {
        builder = builder.with_crl_number_file(root.resolve(&path));
        sources.crl_number = Some(path);
    }
    if let Some(path) = path_option(data, "crl_list", "crl_list_file")? {
        builder = builder.with_crl_list_file(root.resolve(&path));
        sources.crl_list = Some(path);
    }

    if let Some(profiles) = get(data, "profiles") {
        let profiles = profiles.as_mapping().ok_or_else(|| CaConfigError::InvalidArgumentShape {
            field: "profiles".to_string(),
            expected: "映射".to_string(),
            actual: kind_of(profiles).to_string(),
        })?;
        for (name, definition) in profiles {
            let name = name.as_str().ok_or_else(|| CaConfigError::InvalidArgumentShape {
                field: "profiles".to_string(),
                expected: "字符串键".to_string(),
                actual: kind_of(name).to_string(),
            })?;
            builder = builder.with_profile(name, load_profile(name, definition, options)?);
        }
    }

    builder.with_sources(sources).build()
}

/// 加载单个签发模板；模板条目必须是映射
pub fn load_profile(name: &str, definition: &Value, options: &LoadOptions) -> Result<CertProfile, CaConfigError> {
    if !definition.is_mapping() {
        return Err(CaConfigError::InvalidProfileType {
            name: name.to_string(),
            actual: kind_of(definition).to_string(),
        });
    }

    CertProfile::with_validators(definition, options.validators.as_ref()).map_err(|source| CaConfigError::Profile {
        name: name.to_string(),
        source,
    })
}

fn credential_source(option: &str, declaration: &Value) -> Result<Option<CredentialSource>, CaConfigError> {
    if !declaration.is_mapping() {
        return Err(CaConfigError::option_type(option, "凭据声明映射", kind_of(declaration)));
    }
    CredentialSource::resolve(option, declaration).map_err(CaConfigError::credential(option))
}

fn number_option(data: &Mapping, key: &str) -> Result<Option<u64>, CaConfigError> {
    match get(data, key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| CaConfigError::option_type(key, "非负整数", n.to_string())),
        Some(other) => Err(CaConfigError::option_type(key, "非负整数", kind_of(other))),
    }
}

fn string_option(data: &Mapping, key: &str) -> Result<Option<String>, CaConfigError> {
    match get(data, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CaConfigError::option_type(key, "路径字符串", kind_of(other))),
    }
}

fn path_option(data: &Mapping, key: &str, alias: &str) -> Result<Option<String>, CaConfigError> {
    let primary = string_option(data, key)?;
    let aliased = string_option(data, alias)?;
    if primary.is_some() && aliased.is_some() {
        warn!("{} 与 {} 同时出现，使用 {}", key, alias, key);
    }
    Ok(primary.or(aliased))
}
