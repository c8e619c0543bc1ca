// ==========================================
// 绩效监测平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod kpi;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use kpi::{sample_kpis, Kpi, KpiFields};
pub use types::{KpiCategory, KpiRole, ValidationMode};
