// ==========================================
// 绩效监测平台 - 操作日志领域模型
// ==========================================
// 红线: KPI 定义的所有写入必须记录
// 用途: 审计追踪
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
// 对齐: action_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,         // 日志ID (UUID)
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,  // 操作时间戳
    pub actor: String,             // 操作人
    pub kpi_id: Option<i64>,       // 关联KPI (批量操作可为None)

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>, // 变更前后内容 (JSON)

    pub detail: Option<String>,    // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateKpi,   // 新增KPI
    UpdateKpi,   // 修改KPI
    DeleteKpi,   // 删除KPI
    SeedSamples, // 写入示例数据
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateKpi => "CREATE_KPI",
            ActionType::UpdateKpi => "UPDATE_KPI",
            ActionType::DeleteKpi => "DELETE_KPI",
            ActionType::SeedSamples => "SEED_SAMPLES",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_KPI" => Some(ActionType::CreateKpi),
            "UPDATE_KPI" => Some(ActionType::UpdateKpi),
            "DELETE_KPI" => Some(ActionType::DeleteKpi),
            "SEED_SAMPLES" => Some(ActionType::SeedSamples),
            _ => None,
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志（自动生成ID与时间戳）
    pub fn new(action_type: ActionType, actor: &str, kpi_id: Option<i64>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            kpi_id,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn action_type_kind(&self) -> Option<ActionType> {
        ActionType::from_str(&self.action_type)
    }
}
