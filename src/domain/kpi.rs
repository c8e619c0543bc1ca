// ==========================================
// 绩效监测平台 - KPI 定义领域模型
// ==========================================
// 红线: id 由注册表分配，编辑流程不得修改 id
// 说明: formula 仅作展示文本，不解析、不求值
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::{KpiCategory, KpiRole};

// ==========================================
// Kpi - 绩效指标定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub id: i64,             // 注册表分配的唯一ID
    pub name: String,        // 指标名称
    pub description: String, // 指标说明
    pub formula: String,     // 计算公式（展示文本）
    pub weight: i32,         // 权重百分比（0-100 为预期范围，不强制）
    pub role: String,        // 适用角色（显示文本）
    pub category: String,    // 指标类别（显示文本）
}

impl Kpi {
    /// 由ID与草稿组装记录
    pub fn from_fields(id: i64, fields: KpiFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            formula: fields.formula,
            weight: fields.weight,
            role: fields.role,
            category: fields.category,
        }
    }

    /// 除 id 外的全部字段
    pub fn fields(&self) -> KpiFields {
        KpiFields {
            name: self.name.clone(),
            description: self.description.clone(),
            formula: self.formula.clone(),
            weight: self.weight,
            role: self.role.clone(),
            category: self.category.clone(),
        }
    }

    /// 用草稿覆盖除 id 外的全部字段
    pub fn apply(&mut self, fields: KpiFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.formula = fields.formula;
        self.weight = fields.weight;
        self.role = fields.role;
        self.category = fields.category;
    }

    pub fn role_kind(&self) -> Option<KpiRole> {
        KpiRole::parse(&self.role)
    }

    pub fn category_kind(&self) -> Option<KpiCategory> {
        KpiCategory::parse(&self.category)
    }
}

// ==========================================
// KpiFields - KPI 草稿（不含 id）
// ==========================================
// Default 即"新增"表单的空草稿
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiFields {
    pub name: String,
    pub description: String,
    pub formula: String,
    pub weight: i32,
    pub role: String,
    pub category: String,
}

impl KpiFields {
    /// 便捷构造（角色/类别使用枚举）
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        formula: impl Into<String>,
        weight: i32,
        role: KpiRole,
        category: KpiCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            formula: formula.into(),
            weight,
            role: role.as_str().to_string(),
            category: category.as_str().to_string(),
        }
    }
}

// ==========================================
// 示例数据（KPI 管理页初始数据）
// ==========================================

/// 初始的5条 KPI 定义（id 1-5）
pub fn sample_kpis() -> Vec<Kpi> {
    vec![
        Kpi::from_fields(
            1,
            KpiFields::new(
                "File Disposal Rate",
                "Percentage of files disposed within SLA timeframe",
                "(Disposed Files / Total Files) × 100",
                25,
                KpiRole::All,
                KpiCategory::Administrative,
            ),
        ),
        Kpi::from_fields(
            2,
            KpiFields::new(
                "DPR Timeliness",
                "Daily Progress Report submission on time",
                "(On-time DPRs / Total DPRs) × 100",
                20,
                KpiRole::FieldEngineer,
                KpiCategory::Reporting,
            ),
        ),
        Kpi::from_fields(
            3,
            KpiFields::new(
                "Site Visits Completed",
                "Number of scheduled site visits completed",
                "(Completed Visits / Scheduled Visits) × 100",
                20,
                KpiRole::FieldEngineer,
                KpiCategory::FieldOperations,
            ),
        ),
        Kpi::from_fields(
            4,
            KpiFields::new(
                "Budget Utilization",
                "Efficient use of allocated budget",
                "(Spent Amount / Allocated Budget) × 100",
                15,
                KpiRole::ProjectManager,
                KpiCategory::Financial,
            ),
        ),
        Kpi::from_fields(
            5,
            KpiFields::new(
                "Report Quality Score",
                "Quality assessment of submitted reports",
                "Average of quality parameters (0-100)",
                20,
                KpiRole::All,
                KpiCategory::Quality,
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_kpis() {
        let kpis = sample_kpis();
        assert_eq!(kpis.len(), 5);
        let ids: Vec<i64> = kpis.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(kpis.iter().map(|k| k.weight).sum::<i32>(), 100);
        assert!(kpis.iter().all(|k| k.role_kind().is_some()));
        assert!(kpis.iter().all(|k| k.category_kind().is_some()));
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut kpi = sample_kpis().remove(2);
        let mut fields = kpi.fields();
        fields.weight = 30;
        kpi.apply(fields);
        assert_eq!(kpi.id, 3);
        assert_eq!(kpi.weight, 30);
        assert_eq!(kpi.name, "Site Visits Completed");
    }

    #[test]
    fn test_default_draft_is_empty() {
        let draft = KpiFields::default();
        assert!(draft.name.is_empty());
        assert_eq!(draft.weight, 0);
        assert!(draft.role.is_empty());
        assert!(draft.category.is_empty());
    }
}
