//! # 主题字段策略集成测试
//!
//! 覆盖校验成功/失败条件、过滤结果与幂等性

use caconf_policy::{PolicyError, Subject, SubjectItemPolicy};

fn policy(yaml: &str) -> SubjectItemPolicy {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("YAML 应该合法");
    SubjectItemPolicy::from_declaration(&value).expect("策略声明应该合法")
}

#[test]
fn test_required_present_extra_dropped() {
    // CN 必需且存在，L 未声明被丢弃，O 可选但缺失不影响
    let policy = policy("CN: required\nO: optional");
    let subject = Subject::new().with("CN", "example").with("L", "city");

    let filtered = policy.validate_subject(&subject).expect("校验应该通过");
    assert_eq!(filtered.iter().collect::<Vec<_>>(), [("CN", "example")]);
}

#[test]
fn test_missing_required_names_attribute() {
    let policy = policy("CN: required");
    let subject = Subject::new().with("O", "Acme");

    let err = policy.validate_subject(&subject).expect_err("缺少 CN 应该失败");
    assert!(matches!(err, PolicyError::PolicyViolation { .. }));
    assert!(err.to_string().contains("CN"));
}

#[test]
fn test_filter_preserves_relative_order() {
    let policy = policy("CN: required\nO: optional\nOU: optional\nC: required");
    let subject = Subject::new()
        .with("C", "US")
        .with("ST", "Illinois")
        .with("OU", "Ops")
        .with("CN", "host.example.com")
        .with("emailAddress", "ops@example.com")
        .with("O", "Example");

    let filtered = policy.validate_subject(&subject).expect("校验应该通过");
    assert_eq!(filtered.to_string(), "/C=US/OU=Ops/CN=host.example.com/O=Example");
}

#[test]
fn test_validate_is_idempotent() {
    let policy = policy("CN: required\nO: optional");
    let subject = Subject::new()
        .with("CN", "a")
        .with("DC", "x")
        .with("O", "b")
        .with("O", "c");

    let once = policy.validate_subject(&subject).expect("第一次校验应该通过");
    let twice = policy.validate_subject(&once).expect("第二次校验应该通过");
    assert_eq!(once, twice);
}

#[test]
fn test_success_iff_all_required_present() {
    let policy = policy("CN: required\nO: required\nOU: optional");
    let cases: [(&[(&str, &str)], bool); 5] = [
        (&[("CN", "a"), ("O", "b")], true),
        (&[("O", "b"), ("CN", "a"), ("OU", "c")], true),
        (&[("CN", "a"), ("OU", "c")], false),
        (&[("OU", "c")], false),
        (&[], false),
    ];

    for (items, expected) in cases {
        let subject: Subject = items.iter().copied().collect();
        assert_eq!(
            policy.validate_subject(&subject).is_ok(),
            expected,
            "主题 {} 的校验结果不符合预期",
            subject
        );
    }
}

#[test]
fn test_any_other_marker_fails() {
    for marker in ["Required", "mandatory", "", "forbidden"] {
        let result = SubjectItemPolicy::from_pairs([("CN", marker)]);
        assert!(
            matches!(result, Err(PolicyError::InvalidPolicyDeclaration { ref value, .. }) if value == marker),
            "标记 {:?} 应该被拒绝",
            marker
        );
    }
}
