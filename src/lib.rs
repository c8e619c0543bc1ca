// ==========================================
// 绩效监测平台 - KPI 定义管理核心库
// ==========================================
// 技术栈: Rust + SQLite
// 职责: KPI 定义的增删改查、编辑会话、派生统计与持久化
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 注册表/编辑会话/计分卡
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{KpiCategory, KpiRole, ValidationMode};

// 领域实体
pub use domain::{sample_kpis, ActionLog, ActionType, Kpi, KpiFields};

// 引擎
pub use engine::{EditSession, KpiRegistry, KpiSummary, RegistryError, ScorecardEngine};

// 仓储
pub use repository::{InMemoryKpiStore, KpiStore, SqliteKpiRepository};

// API
pub use api::{ApiError, ApiResult, ConfirmPrompt, DeleteOutcome, KpiApi, KpiApiSettings};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "绩效监测平台";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
