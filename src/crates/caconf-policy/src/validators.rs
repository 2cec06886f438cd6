//! # 签发模板字段校验
//!
//! [`FieldValidators`] 为签发模板的每类字段提供一个校验方法，输入为文档中的原始取值
//! （缺失或 `null` 时为 `None`），输出为类型化的字段值。
//! 默认方法实现标准规则；需要更严格或更宽松的规则时只需覆盖对应方法。

use crate::digest::MessageDigest;
use crate::error::PolicyError;
use crate::extensions::{
    BasicConstraints, GeneralName, GeneralNameType, NameConstraints, PolicyConstraints,
    PolicyInformation, UserNotice, EXTENDED_KEY_USAGE_NAMES, KEY_USAGE_NAMES,
};
use crate::subject_policy::SubjectItemPolicy;
use crate::value::{expect_mapping, expect_sequence, expect_str, get, kind_of, non_negative, string_list};
use serde_yaml::Value;
use std::fmt::Debug;
use std::net::IpAddr;

/// 签发模板字段校验能力
pub trait FieldValidators: Debug + Send + Sync {
    /// `basic_constraints`: `{ca: bool, path_length: n}`，仅 CA 可设置 `path_length`
    fn validate_basic_constraints(&self, value: Option<&Value>) -> Result<Option<BasicConstraints>, PolicyError> {
        value.map(basic_constraints).transpose()
    }

    /// `key_usage`: 密钥用途名称序列
    fn validate_key_usage(&self, value: Option<&Value>) -> Result<Vec<String>, PolicyError> {
        value.map(key_usage).transpose().map(Option::unwrap_or_default)
    }

    /// `extended_key_usage`: 短名称或点分OID序列
    fn validate_extended_key_usage(&self, value: Option<&Value>) -> Result<Vec<String>, PolicyError> {
        value.map(extended_key_usage).transpose().map(Option::unwrap_or_default)
    }

    /// `certificate_policies`: 策略条目序列
    fn validate_certificate_policies(&self, value: Option<&Value>) -> Result<Vec<PolicyInformation>, PolicyError> {
        value.map(certificate_policies).transpose().map(Option::unwrap_or_default)
    }

    /// `inhibit_any_policy`: 非负整数
    fn validate_inhibit_any_policy(&self, value: Option<&Value>) -> Result<Option<u32>, PolicyError> {
        value.map(|v| non_negative("inhibit_any_policy", v)).transpose()
    }

    /// `policy_constraints`: 至少包含一个约束
    fn validate_policy_constraints(&self, value: Option<&Value>) -> Result<Option<PolicyConstraints>, PolicyError> {
        value.map(policy_constraints).transpose()
    }

    /// `name_constraints`: `permitted` / `excluded` 通用名称序列
    fn validate_name_constraints(&self, value: Option<&Value>) -> Result<Option<NameConstraints>, PolicyError> {
        value.map(name_constraints).transpose()
    }

    /// `ocsp_location` / `cdp_location` / `ca_issuers_location`: 非空字符串序列
    fn validate_location(&self, field: &str, value: Option<&Value>) -> Result<Vec<String>, PolicyError> {
        value.map(|v| location(field, v)).transpose().map(Option::unwrap_or_default)
    }

    /// `subject_item_policy`: 主题字段策略声明
    fn validate_subject_item_policy(&self, value: Option<&Value>) -> Result<Option<SubjectItemPolicy>, PolicyError> {
        value.map(SubjectItemPolicy::from_declaration).transpose()
    }

    /// 单个摘要算法名称
    fn validate_md(&self, name: &str) -> Result<MessageDigest, PolicyError> {
        name.parse()
    }

    /// `allowed_mds`: 摘要算法序列；结果总是包含 `default_md`
    fn validate_allowed_mds(
        &self,
        value: Option<&Value>,
        default_md: MessageDigest,
    ) -> Result<Vec<MessageDigest>, PolicyError> {
        let mut allowed = Vec::new();
        if let Some(value) = value {
            for item in expect_sequence("allowed_mds", value)? {
                let md = self.validate_md(expect_str("allowed_mds", item)?)?;
                if !allowed.contains(&md) {
                    allowed.push(md);
                }
            }
        }
        if !allowed.contains(&default_md) {
            allowed.push(default_md);
        }
        Ok(allowed)
    }
}

/// 标准字段校验规则
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidators;

impl FieldValidators for StandardValidators {}

fn basic_constraints(value: &Value) -> Result<BasicConstraints, PolicyError> {
    let map = expect_mapping("basic_constraints", value)?;
    let ca = match get(map, "ca") {
        Some(Value::Bool(ca)) => *ca,
        Some(other) => {
            return Err(PolicyError::invalid_field(
                "basic_constraints",
                format!("ca 应为布尔值，实际为{}", kind_of(other)),
            ))
        }
        None => return Err(PolicyError::invalid_field("basic_constraints", "必须包含 ca")),
    };
    let path_length = get(map, "path_length")
        .map(|v| non_negative("basic_constraints.path_length", v))
        .transpose()?;
    if !ca && path_length.is_some() {
        return Err(PolicyError::invalid_field(
            "basic_constraints",
            "path_length 只能在 ca 为 true 时设置",
        ));
    }
    Ok(BasicConstraints { ca, path_length })
}

fn key_usage(value: &Value) -> Result<Vec<String>, PolicyError> {
    let usages = string_list("key_usage", value)?;
    if let Some(unknown) = usages.iter().find(|u| !KEY_USAGE_NAMES.contains(&u.as_str())) {
        return Err(PolicyError::invalid_field(
            "key_usage",
            format!("未知的密钥用途 {}", unknown),
        ));
    }
    Ok(usages)
}

fn extended_key_usage(value: &Value) -> Result<Vec<String>, PolicyError> {
    let usages = string_list("extended_key_usage", value)?;
    if let Some(unknown) = usages
        .iter()
        .find(|u| !EXTENDED_KEY_USAGE_NAMES.contains(&u.as_str()) && !is_dotted_oid(u))
    {
        return Err(PolicyError::invalid_field(
            "extended_key_usage",
            format!("未知的扩展密钥用途 {}", unknown),
        ));
    }
    Ok(usages)
}

fn certificate_policies(value: &Value) -> Result<Vec<PolicyInformation>, PolicyError> {
    const FIELD: &str = "certificate_policies";

    expect_sequence(FIELD, value)?
        .iter()
        .map(|entry| {
            let map = expect_mapping(FIELD, entry)?;
            let policy_identifier = match get(map, "policy_identifier") {
                Some(oid) => expect_str(FIELD, oid)?.to_string(),
                None => return Err(PolicyError::invalid_field(FIELD, "每个策略都必须包含 policy_identifier")),
            };
            if !is_dotted_oid(&policy_identifier) {
                return Err(PolicyError::invalid_field(
                    FIELD,
                    format!("policy_identifier {} 不是合法的OID", policy_identifier),
                ));
            }
            let cps_uris = get(map, "cps_uris")
                .map(|v| string_list("certificate_policies.cps_uris", v))
                .transpose()?
                .unwrap_or_default();
            let user_notices = match get(map, "user_notices") {
                Some(notices) => expect_sequence("certificate_policies.user_notices", notices)?
                    .iter()
                    .map(user_notice)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(PolicyInformation {
                policy_identifier,
                cps_uris,
                user_notices,
            })
        })
        .collect()
}

fn user_notice(value: &Value) -> Result<UserNotice, PolicyError> {
    const FIELD: &str = "certificate_policies.user_notices";

    let map = expect_mapping(FIELD, value)?;
    let explicit_text = get(map, "explicit_text")
        .map(|v| expect_str(FIELD, v).map(str::to_string))
        .transpose()?;
    let organization = get(map, "organization")
        .map(|v| expect_str(FIELD, v).map(str::to_string))
        .transpose()?;
    let notice_numbers = match get(map, "notice_numbers") {
        Some(Value::String(list)) => list
            .split(',')
            .map(|n| {
                n.trim()
                    .parse::<u32>()
                    .map_err(|_| PolicyError::invalid_field(FIELD, format!("notice_numbers 含有非法数字 {}", n.trim())))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => expect_sequence(FIELD, other)?
            .iter()
            .map(|n| non_negative("certificate_policies.user_notices.notice_numbers", n))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    if organization.is_some() != !notice_numbers.is_empty() {
        return Err(PolicyError::invalid_field(
            FIELD,
            "organization 与 notice_numbers 必须同时出现",
        ));
    }
    Ok(UserNotice {
        explicit_text,
        organization,
        notice_numbers,
    })
}

fn policy_constraints(value: &Value) -> Result<PolicyConstraints, PolicyError> {
    let map = expect_mapping("policy_constraints", value)?;
    let require_explicit_policy = get(map, "require_explicit_policy")
        .map(|v| non_negative("policy_constraints.require_explicit_policy", v))
        .transpose()?;
    let inhibit_policy_mapping = get(map, "inhibit_policy_mapping")
        .map(|v| non_negative("policy_constraints.inhibit_policy_mapping", v))
        .transpose()?;
    if require_explicit_policy.is_none() && inhibit_policy_mapping.is_none() {
        return Err(PolicyError::invalid_field(
            "policy_constraints",
            "至少需要 require_explicit_policy 或 inhibit_policy_mapping 之一",
        ));
    }
    Ok(PolicyConstraints {
        require_explicit_policy,
        inhibit_policy_mapping,
    })
}

fn name_constraints(value: &Value) -> Result<NameConstraints, PolicyError> {
    let map = expect_mapping("name_constraints", value)?;
    let permitted = get(map, "permitted")
        .map(|v| general_names("name_constraints.permitted", v))
        .transpose()?;
    let excluded = get(map, "excluded")
        .map(|v| general_names("name_constraints.excluded", v))
        .transpose()?;
    if permitted.is_none() && excluded.is_none() {
        return Err(PolicyError::invalid_field(
            "name_constraints",
            "至少需要 permitted 或 excluded 之一",
        ));
    }
    Ok(NameConstraints {
        permitted: permitted.unwrap_or_default(),
        excluded: excluded.unwrap_or_default(),
    })
}

fn general_names(field: &str, value: &Value) -> Result<Vec<GeneralName>, PolicyError> {
    expect_sequence(field, value)?
        .iter()
        .map(|entry| {
            let map = expect_mapping(field, entry)?;
            let type_name = get(map, "type")
                .ok_or_else(|| PolicyError::invalid_field(field, "缺少 type"))
                .and_then(|v| expect_str(field, v))?;
            let kind = GeneralNameType::parse(type_name)
                .ok_or_else(|| PolicyError::invalid_field(field, format!("未知的名称类型 {}", type_name)))?;
            let value = get(map, "value")
                .ok_or_else(|| PolicyError::invalid_field(field, "缺少 value"))
                .and_then(|v| expect_str(field, v))?;
            check_general_name(field, kind, value)?;
            Ok(GeneralName {
                kind,
                value: value.to_string(),
            })
        })
        .collect()
}

fn check_general_name(field: &str, kind: GeneralNameType, value: &str) -> Result<(), PolicyError> {
    let valid = match kind {
        GeneralNameType::Ip => is_ip_with_netmask(value),
        GeneralNameType::DirName => value.contains('='),
        GeneralNameType::Dns | GeneralNameType::Uri | GeneralNameType::Email => {
            !value.is_empty() && !value.chars().any(char::is_whitespace)
        }
    };
    if valid {
        Ok(())
    } else {
        Err(PolicyError::invalid_field(
            field,
            format!("{} 类型的取值 {} 无效", kind, value),
        ))
    }
}

/// `address/netmask`，两部分必须同为 IPv4 或 IPv6
fn is_ip_with_netmask(value: &str) -> bool {
    let Some((address, netmask)) = value.split_once('/') else {
        return false;
    };
    match (address.parse::<IpAddr>(), netmask.parse::<IpAddr>()) {
        (Ok(IpAddr::V4(_)), Ok(IpAddr::V4(_))) | (Ok(IpAddr::V6(_)), Ok(IpAddr::V6(_))) => true,
        _ => false,
    }
}

fn location(field: &str, value: &Value) -> Result<Vec<String>, PolicyError> {
    let locations = string_list(field, value)?;
    if locations.iter().any(|l| l.trim().is_empty()) {
        return Err(PolicyError::invalid_field(field, "地址不能为空"));
    }
    Ok(locations)
}

/// 点分十进制OID，至少两段
fn is_dotted_oid(s: &str) -> bool {
    let mut arcs = 0;
    for arc in s.split('.') {
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        arcs += 1;
    }
    arcs >= 2
}
