// ==========================================
// 绩效监测平台 - KPI 定义持久化
// ==========================================
// 契约: save(全部KPI) / load() -> 全部KPI
//       已分配最大ID与列表同一事务保存，删除后不回退
// 红线: Repository 不含业务逻辑，只负责数据映射
// 顺序: seq 列保存插入顺序
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::kpi::Kpi;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// KpiStore Trait
// ==========================================
// 实现者: SqliteKpiRepository / InMemoryKpiStore
pub trait KpiStore: Send + Sync {
    /// 整体保存（覆盖原有内容），最大ID推进到列表中的最大ID
    fn save(&self, all: &[Kpi]) -> RepositoryResult<()> {
        let max_id = all.iter().map(|k| k.id).max().unwrap_or(0);
        self.save_with_high_water(all, max_id)
    }

    /// 整体保存并推进已分配最大ID（只增不减）
    fn save_with_high_water(&self, all: &[Kpi], high_water: i64) -> RepositoryResult<()>;

    /// 按保存时的顺序读取全部 KPI
    fn load(&self) -> RepositoryResult<Vec<Kpi>>;

    /// 已分配过的最大ID（从未保存时为 0）
    fn load_high_water(&self) -> RepositoryResult<i64>;
}

const ID_SEQ_NAME: &str = "kpi_definition";

// ==========================================
// SqliteKpiRepository - kpi_definition 表
// ==========================================
pub struct SqliteKpiRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKpiRepository {
    /// 创建新的 SqliteKpiRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 当前表内记录数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM kpi_definition", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl KpiStore for SqliteKpiRepository {
    fn save_with_high_water(&self, all: &[Kpi], high_water: i64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM kpi_definition", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO kpi_definition (
                    id, seq, name, description, formula, weight, role, category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;

            for (seq, kpi) in all.iter().enumerate() {
                stmt.execute(params![
                    kpi.id,
                    seq as i64,
                    kpi.name,
                    kpi.description,
                    kpi.formula,
                    kpi.weight,
                    kpi.role,
                    kpi.category,
                ])?;
            }
        }

        tx.execute(
            r#"
            INSERT INTO kpi_id_seq (name, high_water) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET high_water = MAX(high_water, excluded.high_water)
            "#,
            params![ID_SEQ_NAME, high_water],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn load(&self) -> RepositoryResult<Vec<Kpi>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, formula, weight, role, category
            FROM kpi_definition
            ORDER BY seq ASC, id ASC
            "#,
        )?;

        let kpis = stmt
            .query_map([], |row| {
                Ok(Kpi {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    formula: row.get(3)?,
                    weight: row.get(4)?,
                    role: row.get(5)?,
                    category: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(kpis)
    }

    fn load_high_water(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let high_water = conn
            .query_row(
                "SELECT high_water FROM kpi_id_seq WHERE name = ?1",
                params![ID_SEQ_NAME],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(high_water.unwrap_or(0))
    }
}

// ==========================================
// InMemoryKpiStore - 内存实现（测试/无库运行）
// ==========================================
#[derive(Default)]
pub struct InMemoryKpiStore {
    kpis: Mutex<Vec<Kpi>>,
    high_water: Mutex<i64>,
}

impl InMemoryKpiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kpis(kpis: Vec<Kpi>) -> Self {
        let max_id = kpis.iter().map(|k| k.id).max().unwrap_or(0);
        Self {
            kpis: Mutex::new(kpis),
            high_water: Mutex::new(max_id),
        }
    }
}

impl KpiStore for InMemoryKpiStore {
    fn save_with_high_water(&self, all: &[Kpi], high_water: i64) -> RepositoryResult<()> {
        let mut kpis = self
            .kpis
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut stored = self
            .high_water
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        *kpis = all.to_vec();
        *stored = (*stored).max(high_water);
        Ok(())
    }

    fn load(&self) -> RepositoryResult<Vec<Kpi>> {
        let guard = self
            .kpis
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(guard.clone())
    }

    fn load_high_water(&self) -> RepositoryResult<i64> {
        let guard = self
            .high_water
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(*guard)
    }
}
