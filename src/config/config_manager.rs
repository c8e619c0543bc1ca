// ==========================================
// 绩效监测平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::ValidationMode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== KPI 配置 =====

    /// 草稿校验模式（默认 PERMISSIVE）
    pub fn get_validation_mode(&self) -> RepositoryResult<ValidationMode> {
        let value = self.get_config_or_default(config_keys::KPI_VALIDATION_MODE, "PERMISSIVE")?;
        Ok(ValidationMode::from_str(&value))
    }

    /// 每次写入后是否自动保存（默认 true）
    pub fn get_autosave(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::KPI_AUTOSAVE, "true")?;
        Ok(parse_bool(&value, true))
    }

    /// 空库时是否写入示例KPI（默认 true）
    pub fn get_seed_samples(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::KPI_SEED_SAMPLES, "true")?;
        Ok(parse_bool(&value, true))
    }

    /// 界面语言（默认 zh-CN）
    pub fn get_locale(&self) -> RepositoryResult<String> {
        let value = self.get_config_or_default(config_keys::UI_LOCALE, "zh-CN")?;
        Ok(match value.trim() {
            "en" => "en".to_string(),
            _ => "zh-CN".to_string(),
        })
    }
}

fn parse_bool(v: &str, default: bool) -> bool {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => true,
        "0" | "false" | "no" | "n" | "off" => false,
        _ => default,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // KPI 定义管理
    pub const KPI_VALIDATION_MODE: &str = "kpi/validation_mode";
    pub const KPI_AUTOSAVE: &str = "kpi/autosave";
    pub const KPI_SEED_SAMPLES: &str = "kpi/seed_samples";

    // 界面
    pub const UI_LOCALE: &str = "ui/locale";
}
