// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#![allow(dead_code)]

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;

use kpi_registry::api::{KpiApi, KpiApiSettings};
use kpi_registry::config::ConfigManager;
use kpi_registry::repository::{ActionLogRepository, SqliteKpiRepository};
use tempfile::NamedTempFile;

pub use test_helpers::valid_draft;

pub const TEST_OPERATOR: &str = "admin";

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// SQLite 临时库 + KpiApi + 仓储（用于断言落库结果）
pub struct ApiTestEnv {
    pub db_path: String,
    pub kpi_api: Arc<KpiApi>,
    pub kpi_repo: Arc<SqliteKpiRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
    pub config_manager: Arc<ConfigManager>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 默认配置（宽松校验、自动保存、空库写示例数据）
    pub fn new() -> Result<Self, String> {
        Self::with_settings(KpiApiSettings::default())
    }

    pub fn with_settings(settings: KpiApiSettings) -> Result<Self, String> {
        let (temp_file, db_path) =
            test_helpers::create_test_db().map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let conn = test_helpers::open_shared_connection(&db_path)
            .map_err(|e| format!("打开连接失败: {}", e))?;

        let kpi_repo = Arc::new(SqliteKpiRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("创建ConfigManager失败: {}", e))?,
        );

        let kpi_api = Arc::new(KpiApi::new(
            kpi_repo.clone(),
            Some(action_log_repo.clone()),
            settings,
        ));
        kpi_api
            .load(TEST_OPERATOR)
            .map_err(|e| format!("加载KPI失败: {}", e))?;

        Ok(Self {
            db_path,
            kpi_api,
            kpi_repo,
            action_log_repo,
            config_manager,
            _temp_file: temp_file,
        })
    }

    /// 在同一数据库上新建 KpiApi（模拟重启）
    pub fn reopen(&self, settings: KpiApiSettings) -> Result<KpiApi, String> {
        let conn = test_helpers::open_shared_connection(&self.db_path)
            .map_err(|e| format!("打开连接失败: {}", e))?;
        let kpi_api = KpiApi::new(
            Arc::new(SqliteKpiRepository::from_connection(conn.clone())),
            Some(Arc::new(ActionLogRepository::new(conn))),
            settings,
        );
        kpi_api
            .load(TEST_OPERATOR)
            .map_err(|e| format!("加载KPI失败: {}", e))?;
        Ok(kpi_api)
    }
}
