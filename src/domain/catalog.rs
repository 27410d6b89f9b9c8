//! Task catalog model: task types, subtasks and parameter schemas.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration category, e.g. `VLAN 설정`.
pub type TaskType = String;

/// Action within a task type, e.g. `create`.
pub type Subtask = String;

/// Input control kind of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Select,
    /// Any other kind; kept verbatim and rendered as a text input.
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::Other(kind) => kind,
        }
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "select" => FieldKind::Select,
            _ => FieldKind::Other(value),
        }
    }
}

impl From<FieldKind> for String {
    fn from(value: FieldKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value/label pair of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Plain(String),
    Pair { value: String, label: Option<String> },
}

impl From<RawOption> for SelectOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Plain(value) => SelectOption { label: value.clone(), value },
            RawOption::Pair { value, label } => {
                SelectOption { label: label.unwrap_or_else(|| value.clone()), value }
            }
        }
    }
}

/// Metadata describing one form field needed to execute a subtask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(alias = "id")]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl ParameterSchema {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: FieldKind::Text,
            required: false,
            pattern: None,
            placeholder: None,
            description: None,
            options: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.kind = FieldKind::Select;
        self.options = options;
        self
    }

    /// Label to show, falling back to the field name.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() { &self.name } else { &self.label }
    }
}

const TASK_TYPE_LABELS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "vlan",
        "VLAN 관리",
        &[
            ("create", "VLAN 생성"),
            ("delete", "VLAN 삭제"),
            ("interface_assign", "VLAN 인터페이스 할당"),
            ("trunk", "트렁크 설정"),
        ],
    ),
    (
        "port",
        "포트 설정",
        &[
            ("mode", "액세스/트렁크 모드 설정"),
            ("speed", "포트 속도/듀플렉스 조정"),
            ("status", "인터페이스 활성화"),
        ],
    ),
    (
        "routing",
        "라우팅 설정",
        &[("static", "정적 라우팅"), ("ospf", "OSPF 설정"), ("eigrp", "EIGRP 설정"), ("bgp", "BGP 설정")],
    ),
    (
        "security",
        "보안 설정",
        &[
            ("port_security", "Port Security"),
            ("ssh", "SSH/Telnet 제한"),
            ("aaa", "AAA 인증"),
            ("acl", "ACL 설정"),
        ],
    ),
    ("stp_lacp", "STP 및 LACP", &[("stp", "STP 설정"), ("lacp", "LACP/포트 채널 구성")]),
    (
        "qos",
        "QoS 및 트래픽 제어",
        &[
            ("policy", "QoS 정책 적용"),
            ("rate_limit", "트래픽 제한"),
            ("service_policy", "서비스 정책 설정"),
        ],
    ),
    (
        "monitoring",
        "라우팅 상태 모니터링",
        &[
            ("route", "show ip route"),
            ("ospf", "show ip ospf neighbor"),
            ("bgp", "show ip bgp summary"),
        ],
    ),
    ("status", "네트워크 상태 점검", &[("interface", "인터페이스 상태 확인"), ("traffic", "트래픽 모니터링")]),
    ("logging", "로그 수집", &[("show", "show logging")]),
    (
        "backup",
        "구성 백업 및 복원",
        &[("backup", "설정 백업"), ("restore", "설정 복원"), ("tftp", "TFTP 복원")],
    ),
    ("snmp", "SNMP 및 모니터링", &[("setup", "SNMP 설정"), ("discovery", "CDP/LLDP 정보 수집")]),
    ("automation", "자동화 스크립트 확장", &[("deploy", "설정 배포"), ("verify", "조건 검증 및 변경")]),
];

/// Display label for a task type; identifiers without a known label are shown as-is.
pub fn task_type_label(task_type: &str) -> &str {
    TASK_TYPE_LABELS
        .iter()
        .find(|(id, _, _)| *id == task_type)
        .map(|(_, label, _)| *label)
        .unwrap_or(task_type)
}

/// Display label for a subtask of a task type.
pub fn subtask_label<'a>(task_type: &str, subtask: &'a str) -> &'a str {
    TASK_TYPE_LABELS
        .iter()
        .find(|(id, _, _)| *id == task_type)
        .and_then(|(_, _, subtasks)| subtasks.iter().find(|(id, _)| *id == subtask))
        .map(|(_, label)| *label)
        .unwrap_or(subtask)
}
