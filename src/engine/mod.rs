// ==========================================
// 绩效监测平台 - 引擎层
// ==========================================
// 职责: KPI 注册表、编辑会话、计分卡等业务规则
// 红线: Engine 不拼 SQL
// ==========================================

pub mod edit_session;
pub mod kpi_registry;
pub mod scorecard;

// 重导出核心引擎
pub use edit_session::{EditSession, SaveIntent};
pub use kpi_registry::{KpiRegistry, KpiSummary, RegistryError, RegistryResult};
pub use scorecard::{KpiMeasurement, Scorecard, ScorecardEngine, ScorecardEntry};
