//! # 文档取值辅助函数
//!
//! 在 `serde_yaml::Value` 上做类型检查，失败时返回带字段名的 [`PolicyError`]。
//! 显式的 `null` 与缺失等价。

use crate::error::PolicyError;
use serde_yaml::{Mapping, Value};

/// 取值类型的中文描述，用于错误消息
pub fn kind_of(value: &Value) -> &'static str {
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

/// 按键读取映射中的值，`null` 视为缺失
pub fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    match map.get(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// 要求取值为映射
pub fn expect_mapping<'a>(field: &str, value: &'a Value) -> Result<&'a Mapping, PolicyError> {
    value
        .as_mapping()
        .ok_or_else(|| PolicyError::shape(field, "映射", kind_of(value)))
}

/// 要求取值为序列
pub fn expect_sequence<'a>(field: &str, value: &'a Value) -> Result<&'a [Value], PolicyError> {
    value
        .as_sequence()
        .map(|seq| seq.as_slice())
        .ok_or_else(|| PolicyError::shape(field, "序列", kind_of(value)))
}

/// 要求取值为字符串
pub fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, PolicyError> {
    value
        .as_str()
        .ok_or_else(|| PolicyError::invalid_field(field, format!("应为字符串，实际为{}", kind_of(value))))
}

/// 要求取值为字符串序列
pub fn string_list(field: &str, value: &Value) -> Result<Vec<String>, PolicyError> {
    expect_sequence(field, value)?
        .iter()
        .map(|item| expect_str(field, item).map(str::to_string))
        .collect()
}

/// 要求取值为非负整数
pub fn non_negative(field: &str, value: &Value) -> Result<u32, PolicyError> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| PolicyError::invalid_field(field, "必须是非负整数"))
}

/// 映射的键必须是字符串
pub fn key_str<'a>(field: &str, key: &'a Value) -> Result<&'a str, PolicyError> {
    key.as_str()
        .ok_or_else(|| PolicyError::shape(field, "以字符串为键的映射", format!("键为{}", kind_of(key))))
}
