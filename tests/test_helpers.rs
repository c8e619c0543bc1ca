// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};

use kpi_registry::domain::kpi::KpiFields;
use kpi_registry::domain::types::{KpiCategory, KpiRole};
use rusqlite::Connection;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是合法UTF-8")?
        .to_string();

    let conn = kpi_registry::db::open_sqlite_connection(&db_path)?;
    kpi_registry::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（schema 已初始化）
pub fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = kpi_registry::db::open_sqlite_connection(db_path)?;
    kpi_registry::db::init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 合法的新增草稿
pub fn valid_draft(name: &str) -> KpiFields {
    KpiFields::new(
        name,
        "Created by integration test",
        "(Done / Planned) × 100",
        10,
        KpiRole::Admin,
        KpiCategory::Administrative,
    )
}
