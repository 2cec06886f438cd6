//! # 签发模板
//!
//! [`CertProfile`] 是一组不可变的签发策略：扩展项设置、允许/默认摘要算法与可选的主题字段策略。
//! 所有字段在构造时由 [`FieldValidators`] 一次性校验，任何字段失败都不会产生模板。

use crate::digest::MessageDigest;
use crate::error::PolicyError;
use crate::extensions::{BasicConstraints, NameConstraints, PolicyConstraints, PolicyInformation};
use crate::subject_policy::SubjectItemPolicy;
use crate::validators::{FieldValidators, StandardValidators};
use crate::value::{expect_mapping, expect_str, get};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// 签发模板在文档中可用的键
pub const PROFILE_KEYS: [&str; 14] = [
    "basic_constraints",
    "key_usage",
    "extended_key_usage",
    "certificate_policies",
    "inhibit_any_policy",
    "policy_constraints",
    "name_constraints",
    "ocsp_no_check",
    "subject_item_policy",
    "ocsp_location",
    "cdp_location",
    "ca_issuers_location",
    "default_md",
    "allowed_mds",
];

/// 签发模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertProfile {
    basic_constraints: Option<BasicConstraints>,
    key_usage: Vec<String>,
    extended_key_usage: Vec<String>,
    certificate_policies: Vec<PolicyInformation>,
    inhibit_any_policy: Option<u32>,
    policy_constraints: Option<PolicyConstraints>,
    name_constraints: Option<NameConstraints>,
    ocsp_no_check: bool,
    subject_item_policy: Option<SubjectItemPolicy>,
    ocsp_location: Vec<String>,
    cdp_location: Vec<String>,
    ca_issuers_location: Vec<String>,
    default_md: MessageDigest,
    allowed_mds: Vec<MessageDigest>,
}

impl Default for CertProfile {
    fn default() -> Self {
        Self {
            basic_constraints: None,
            key_usage: Vec::new(),
            extended_key_usage: Vec::new(),
            certificate_policies: Vec::new(),
            inhibit_any_policy: None,
            policy_constraints: None,
            name_constraints: None,
            ocsp_no_check: false,
            subject_item_policy: None,
            ocsp_location: Vec::new(),
            cdp_location: Vec::new(),
            ca_issuers_location: Vec::new(),
            default_md: MessageDigest::DEFAULT,
            allowed_mds: vec![MessageDigest::DEFAULT],
        }
    }
}

impl CertProfile {
    /// 创建模板构建器
    pub fn builder() -> CertProfileBuilder {
        CertProfileBuilder::new()
    }

    /// 使用标准校验规则从文档映射构造
    pub fn from_document(value: &Value) -> Result<Self, PolicyError> {
        Self::with_validators(value, &StandardValidators)
    }

    /// 使用指定的校验规则从文档映射构造
    pub fn with_validators(value: &Value, validators: &dyn FieldValidators) -> Result<Self, PolicyError> {
        let options = expect_mapping("profile", value)?;

        for key in options.keys() {
            match key.as_str() {
                Some(name) if PROFILE_KEYS.contains(&name) => {}
                Some(name) => warn!("忽略签发模板中未知的键: {}", name),
                None => warn!("忽略签发模板中的非字符串键"),
            }
        }

        let default_md = match get(options, "default_md") {
            Some(md) => validators.validate_md(expect_str("default_md", md)?)?,
            None => MessageDigest::DEFAULT,
        };

        let profile = CertProfile {
            basic_constraints: validators.validate_basic_constraints(get(options, "basic_constraints"))?,
            key_usage: validators.validate_key_usage(get(options, "key_usage"))?,
            extended_key_usage: validators.validate_extended_key_usage(get(options, "extended_key_usage"))?,
            certificate_policies: validators.validate_certificate_policies(get(options, "certificate_policies"))?,
            inhibit_any_policy: validators.validate_inhibit_any_policy(get(options, "inhibit_any_policy"))?,
            policy_constraints: validators.validate_policy_constraints(get(options, "policy_constraints"))?,
            name_constraints: validators.validate_name_constraints(get(options, "name_constraints"))?,
            ocsp_no_check: parse_ocsp_no_check(get(options, "ocsp_no_check")),
            subject_item_policy: validators.validate_subject_item_policy(get(options, "subject_item_policy"))?,
            ocsp_location: validators.validate_location("ocsp_location", get(options, "ocsp_location"))?,
            cdp_location: validators.validate_location("cdp_location", get(options, "cdp_location"))?,
            ca_issuers_location: validators
                .validate_location("ca_issuers_location", get(options, "ca_issuers_location"))?,
            default_md,
            allowed_mds: validators.validate_allowed_mds(get(options, "allowed_mds"), default_md)?,
        };

        if !profile.allowed_mds.contains(&profile.default_md) {
            return Err(PolicyError::invalid_field(
                "allowed_mds",
                format!("必须包含默认摘要算法 {}", profile.default_md),
            ));
        }

        debug!(
            "签发模板构造完成: default_md={}, allowed_mds={:?}",
            profile.default_md, profile.allowed_mds
        );
        Ok(profile)
    }

    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        self.basic_constraints.as_ref()
    }

    pub fn key_usage(&self) -> &[String] {
        &self.key_usage
    }

    pub fn extended_key_usage(&self) -> &[String] {
        &self.extended_key_usage
    }

    pub fn certificate_policies(&self) -> &[PolicyInformation] {
        &self.certificate_policies
    }

    pub fn inhibit_any_policy(&self) -> Option<u32> {
        self.inhibit_any_policy
    }

    pub fn policy_constraints(&self) -> Option<&PolicyConstraints> {
        self.policy_constraints.as_ref()
    }

    pub fn name_constraints(&self) -> Option<&NameConstraints> {
        self.name_constraints.as_ref()
    }

    /// 是否添加 OCSP No Check 扩展
    pub fn ocsp_no_check(&self) -> bool {
        self.ocsp_no_check
    }

    pub fn subject_item_policy(&self) -> Option<&SubjectItemPolicy> {
        self.subject_item_policy.as_ref()
    }

    pub fn ocsp_location(&self) -> &[String] {
        &self.ocsp_location
    }

    pub fn cdp_location(&self) -> &[String] {
        &self.cdp_location
    }

    pub fn ca_issuers_location(&self) -> &[String] {
        &self.ca_issuers_location
    }

    pub fn default_md(&self) -> MessageDigest {
        self.default_md
    }

    /// 允许的摘要算法，总是包含 `default_md`
    pub fn allowed_mds(&self) -> &[MessageDigest] {
        &self.allowed_mds
    }

    /// 导出为文档映射，只包含非空字段
    pub fn to_document(&self) -> Result<Value, PolicyError> {
        let mut map = Mapping::new();

        insert_serialized(&mut map, "basic_constraints", &self.basic_constraints)?;
        insert_list(&mut map, "key_usage", &self.key_usage);
        insert_list(&mut map, "extended_key_usage", &self.extended_key_usage);
        if !self.certificate_policies.is_empty() {
            insert_serialized(&mut map, "certificate_policies", &Some(&self.certificate_policies))?;
        }
        if let Some(inhibit) = self.inhibit_any_policy {
            map.insert(Value::from("inhibit_any_policy"), Value::from(inhibit));
        }
        insert_serialized(&mut map, "policy_constraints", &self.policy_constraints)?;
        insert_serialized(&mut map, "name_constraints", &self.name_constraints)?;
        if self.ocsp_no_check {
            map.insert(Value::from("ocsp_no_check"), Value::from(true));
        }
        if let Some(policy) = &self.subject_item_policy {
            map.insert(Value::from("subject_item_policy"), policy.to_document());
        }
        insert_list(&mut map, "ocsp_location", &self.ocsp_location);
        insert_list(&mut map, "cdp_location", &self.cdp_location);
        insert_list(&mut map, "ca_issuers_location", &self.ca_issuers_location);
        map.insert(Value::from("default_md"), Value::from(self.default_md.name()));
        map.insert(
            Value::from("allowed_mds"),
            Value::Sequence(self.allowed_mds.iter().map(|md| Value::from(md.name())).collect()),
        );

        Ok(Value::Mapping(map))
    }
}

/// `true` 与字符串 `"true"` 视为开启，其余一律关闭
fn parse_ocsp_no_check(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

fn insert_list(map: &mut Mapping, key: &str, items: &[String]) {
    if !items.is_empty() {
        map.insert(
            Value::from(key),
            Value::Sequence(items.iter().map(|s| Value::from(s.as_str())).collect()),
        );
    }
}

fn insert_serialized<T: Serialize>(map: &mut Mapping, key: &str, item: &Option<T>) -> Result<(), PolicyError> {
    if let Some(item) = item {
        let value = serde_yaml::to_value(item).map_err(|e| PolicyError::Serialization(e.to_string()))?;
        map.insert(Value::from(key), value);
    }
    Ok(())
}

/// 签发模板构建器
///
/// 以类型化的方式填写选项，构建时与文档走同一条校验路径。
///
/// ```rust
/// use caconf_policy::{CertProfile, MessageDigest};
///
/// let profile = CertProfile::builder()
///     .with_basic_constraints(false, None)
///     .with_key_usage(["digitalSignature", "keyEncipherment"])
///     .with_extended_key_usage(["serverAuth"])
///     .with_subject_item_policy([("CN", "required"), ("O", "optional")])
///     .with_default_md("SHA384")
///     .build()
///     .unwrap();
///
/// assert_eq!(profile.default_md(), MessageDigest::Sha384);
/// assert!(profile.allowed_mds().contains(&MessageDigest::Sha384));
/// ```
#[derive(Debug, Clone)]
pub struct CertProfileBuilder {
    options: Mapping,
    validators: Arc<dyn FieldValidators>,
}

impl Default for CertProfileBuilder {
    fn default() -> Self {
        Self {
            options: Mapping::new(),
            validators: Arc::new(StandardValidators),
        }
    }
}

impl CertProfileBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置任意选项的原始取值
    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(Value::from(key), value);
        self
    }

    /// 设置基本约束
    pub fn with_basic_constraints(self, ca: bool, path_length: Option<u32>) -> Self {
        let mut map = Mapping::new();
        map.insert(Value::from("ca"), Value::from(ca));
        if let Some(path_length) = path_length {
            map.insert(Value::from("path_length"), Value::from(path_length));
        }
        self.with_option("basic_constraints", Value::Mapping(map))
    }

    /// 设置密钥用途
    pub fn with_key_usage<I, S>(self, usages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("key_usage", string_sequence(usages))
    }

    /// 设置扩展密钥用途
    pub fn with_extended_key_usage<I, S>(self, usages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("extended_key_usage", string_sequence(usages))
    }

    /// 设置 inhibitAnyPolicy
    pub fn with_inhibit_any_policy(self, skip_certs: u32) -> Self {
        self.with_option("inhibit_any_policy", Value::from(skip_certs))
    }

    /// 设置策略约束
    pub fn with_policy_constraints(
        self,
        require_explicit_policy: Option<u32>,
        inhibit_policy_mapping: Option<u32>,
    ) -> Self {
        let mut map = Mapping::new();
        if let Some(n) = require_explicit_policy {
            map.insert(Value::from("require_explicit_policy"), Value::from(n));
        }
        if let Some(n) = inhibit_policy_mapping {
            map.insert(Value::from("inhibit_policy_mapping"), Value::from(n));
        }
        self.with_option("policy_constraints", Value::Mapping(map))
    }

    /// 设置 OCSP No Check
    pub fn with_ocsp_no_check(self, enabled: bool) -> Self {
        self.with_option("ocsp_no_check", Value::from(enabled))
    }

    /// 设置主题字段策略声明
    pub fn with_subject_item_policy<I, K, V>(self, declaration: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: Mapping = declaration
            .into_iter()
            .map(|(k, v)| (Value::from(k.into()), Value::from(v.into())))
            .collect();
        self.with_option("subject_item_policy", Value::Mapping(map))
    }

    /// 设置 OCSP 地址
    pub fn with_ocsp_location<I, S>(self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("ocsp_location", string_sequence(locations))
    }

    /// 设置 CRL 分发点
    pub fn with_cdp_location<I, S>(self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("cdp_location", string_sequence(locations))
    }

    /// 设置 CA Issuers 地址
    pub fn with_ca_issuers_location<I, S>(self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("ca_issuers_location", string_sequence(locations))
    }

    /// 设置默认摘要算法
    pub fn with_default_md(self, md: impl Into<String>) -> Self {
        self.with_option("default_md", Value::from(md.into()))
    }

    /// 设置允许的摘要算法
    pub fn with_allowed_mds<I, S>(self, mds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_option("allowed_mds", string_sequence(mds))
    }

    /// 替换字段校验规则
    pub fn with_validators(mut self, validators: Arc<dyn FieldValidators>) -> Self {
        self.validators = validators;
        self
    }

    /// 校验并构建模板
    pub fn build(self) -> Result<CertProfile, PolicyError> {
        CertProfile::with_validators(&Value::Mapping(self.options), self.validators.as_ref())
    }
}

fn string_sequence<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Sequence(items.into_iter().map(|s| Value::from(s.into())).collect())
}
