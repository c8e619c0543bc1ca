// ==========================================
// 绩效监测平台 - KPI 草稿校验器
// ==========================================
// 职责: 新增/编辑保存前的草稿校验
// 规则: 名称非空、权重 0-100、角色/类别属于枚举集合
// 模式: 宽松（默认，仅告警）/ 严格（返回 InvalidInput 类错误）
// ==========================================

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::kpi::KpiFields;
use crate::domain::types::{KpiCategory, KpiRole};

pub use crate::domain::types::ValidationMode;

/// 权重允许范围（百分比）
pub const WEIGHT_MIN: i32 = 0;
pub const WEIGHT_MAX: i32 = 100;

// ==========================================
// KpiDraftValidator - 草稿校验器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct KpiDraftValidator;

impl KpiDraftValidator {
    pub fn new() -> Self {
        Self
    }

    /// 收集草稿的全部违规项（不区分模式）
    pub fn check(&self, draft: &KpiFields) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();

        if draft.name.trim().is_empty() {
            violations.push(ValidationViolation {
                violation_type: "EMPTY_NAME".to_string(),
                field: "name".to_string(),
                reason: "KPI名称不能为空".to_string(),
                details: None,
            });
        }

        if !(WEIGHT_MIN..=WEIGHT_MAX).contains(&draft.weight) {
            violations.push(ValidationViolation {
                violation_type: "WEIGHT_OUT_OF_RANGE".to_string(),
                field: "weight".to_string(),
                reason: format!("权重{}超出范围{}-{}", draft.weight, WEIGHT_MIN, WEIGHT_MAX),
                details: Some(serde_json::json!({
                    "weight": draft.weight,
                    "min": WEIGHT_MIN,
                    "max": WEIGHT_MAX,
                })),
            });
        }

        if KpiRole::parse(&draft.role).is_none() {
            violations.push(ValidationViolation {
                violation_type: "UNKNOWN_ROLE".to_string(),
                field: "role".to_string(),
                reason: format!("未知角色: '{}'", draft.role),
                details: Some(serde_json::json!({
                    "allowed": KpiRole::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
                })),
            });
        }

        if KpiCategory::parse(&draft.category).is_none() {
            violations.push(ValidationViolation {
                violation_type: "UNKNOWN_CATEGORY".to_string(),
                field: "category".to_string(),
                reason: format!("未知类别: '{}'", draft.category),
                details: Some(serde_json::json!({
                    "allowed": KpiCategory::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                })),
            });
        }

        violations
    }

    /// 按模式校验草稿
    ///
    /// # 返回
    /// - Ok(Vec<ValidationViolation>): 校验通过，返回警告列表（宽松模式下可能非空）
    /// - Err(ApiError::DraftValidationError): 严格模式下存在违规
    pub fn validate(
        &self,
        draft: &KpiFields,
        mode: ValidationMode,
    ) -> ApiResult<Vec<ValidationViolation>> {
        let violations = self.check(draft);

        if !violations.is_empty() {
            match mode {
                ValidationMode::Strict => {
                    return Err(ApiError::DraftValidationError {
                        reason: format!("{}项违规", violations.len()),
                        violations,
                    });
                }
                ValidationMode::Permissive => {
                    tracing::warn!("宽松模式: 接受含{}项违规的KPI草稿", violations.len());
                }
            }
        }

        Ok(violations)
    }
}
