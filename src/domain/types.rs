// ==========================================
// 绩效监测平台 - 领域类型定义
// ==========================================
// 角色与类别为枚举集合; 实体中以显示文本存储
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// KPI 适用角色 (KPI Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KpiRole {
    #[serde(rename = "All")]
    All, // 全员
    #[serde(rename = "Field Engineer")]
    FieldEngineer, // 现场工程师
    #[serde(rename = "Project Manager")]
    ProjectManager, // 项目经理
    #[serde(rename = "Admin")]
    Admin, // 管理员
}

impl KpiRole {
    pub const ALL: [KpiRole; 4] = [
        KpiRole::All,
        KpiRole::FieldEngineer,
        KpiRole::ProjectManager,
        KpiRole::Admin,
    ];

    /// 显示文本（与表单选项值一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiRole::All => "All",
            KpiRole::FieldEngineer => "Field Engineer",
            KpiRole::ProjectManager => "Project Manager",
            KpiRole::Admin => "Admin",
        }
    }

    /// 从显示文本解析，未知值返回 None
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s.trim())
    }

    /// 国际化标签
    pub fn label(&self) -> String {
        let key = match self {
            KpiRole::All => "kpi.role.all",
            KpiRole::FieldEngineer => "kpi.role.field_engineer",
            KpiRole::ProjectManager => "kpi.role.project_manager",
            KpiRole::Admin => "kpi.role.admin",
        };
        crate::i18n::t(key)
    }

    /// 该角色定义的 KPI 是否适用于 `role`
    pub fn applies_to(&self, role: KpiRole) -> bool {
        *self == KpiRole::All || *self == role
    }
}

impl fmt::Display for KpiRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// KPI 类别 (KPI Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KpiCategory {
    #[serde(rename = "Administrative")]
    Administrative, // 行政
    #[serde(rename = "Reporting")]
    Reporting, // 报告
    #[serde(rename = "Field Operations")]
    FieldOperations, // 现场作业
    #[serde(rename = "Financial")]
    Financial, // 财务
    #[serde(rename = "Quality")]
    Quality, // 质量
}

impl KpiCategory {
    pub const ALL: [KpiCategory; 5] = [
        KpiCategory::Administrative,
        KpiCategory::Reporting,
        KpiCategory::FieldOperations,
        KpiCategory::Financial,
        KpiCategory::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiCategory::Administrative => "Administrative",
            KpiCategory::Reporting => "Reporting",
            KpiCategory::FieldOperations => "Field Operations",
            KpiCategory::Financial => "Financial",
            KpiCategory::Quality => "Quality",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s.trim())
    }

    pub fn label(&self) -> String {
        let key = match self {
            KpiCategory::Administrative => "kpi.category.administrative",
            KpiCategory::Reporting => "kpi.category.reporting",
            KpiCategory::FieldOperations => "kpi.category.field_operations",
            KpiCategory::Financial => "kpi.category.financial",
            KpiCategory::Quality => "kpi.category.quality",
        };
        crate::i18n::t(key)
    }
}

impl fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 草稿校验模式 (Validation Mode)
// ==========================================
// 宽松模式为默认行为: 违规只告警，草稿原样接受
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMode {
    #[default]
    Permissive, // 宽松：违规记录为警告
    Strict,     // 严格：任何违规都返回错误
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Permissive => write!(f, "PERMISSIVE"),
            ValidationMode::Strict => write!(f, "STRICT"),
        }
    }
}

impl ValidationMode {
    /// 从配置值解析，未知值回落为默认
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "STRICT" => ValidationMode::Strict,
            _ => ValidationMode::Permissive,
        }
    }
}
