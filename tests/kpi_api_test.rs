// ==========================================
// KpiApi 集成测试
// ==========================================
// 测试范围:
// 1. 查询与派生统计: list, get, summary, weight_by_role, list_for_role
// 2. 写入: create, update, delete, request_delete（含落库与操作日志）
// 3. 编辑会话: open_add, open_edit, edit_draft, cancel_edit, save_edit
// 4. 校验模式: 宽松/严格
// ==========================================

mod helpers;

use std::collections::HashMap;

use helpers::api_test_helper::*;
use kpi_registry::api::{ApiError, DeleteOutcome, KpiApiSettings, ValidationMode};
use kpi_registry::domain::{ActionType, KpiRole};
use kpi_registry::engine::scorecard::KpiMeasurement;
use kpi_registry::repository::KpiStore;

// ==========================================
// 查询测试
// ==========================================

#[test]
fn test_list_空库写入示例数据() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let kpis = env.kpi_api.list().expect("查询失败");
    let ids: Vec<i64> = kpis.iter().map(|k| k.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(kpis[0].name, "File Disposal Rate");

    // 示例数据已落库
    assert_eq!(env.kpi_repo.count().expect("统计失败"), 5);

    let seeded = env.action_log_repo.find_recent(10).expect("查询日志失败");
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].action_type_kind(), Some(ActionType::SeedSamples));
}

#[test]
fn test_summary_示例数据() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let summary = env.kpi_api.summary().expect("查询失败");
    assert_eq!(summary.total_count, 5);
    assert_eq!(summary.category_count, 5);
    assert_eq!(summary.total_weight, 100);

    let by_role = env.kpi_api.weight_by_role().expect("查询失败");
    assert_eq!(by_role.get("All"), Some(&45));
    assert_eq!(by_role.get("Field Engineer"), Some(&40));
    assert_eq!(by_role.get("Project Manager"), Some(&15));
}

#[test]
fn test_list_for_role_包含通用指标() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let ids: Vec<i64> = env
        .kpi_api
        .list_for_role(KpiRole::FieldEngineer)
        .expect("查询失败")
        .iter()
        .map(|k| k.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
}

#[test]
fn test_get_不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let err = env.kpi_api.get(42).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.code(), "NOT_FOUND");
}

// ==========================================
// 写入测试
// ==========================================

#[test]
fn test_create_分配新ID并落库() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = env
        .kpi_api
        .create(valid_draft("Timesheet Compliance"), TEST_OPERATOR)
        .expect("新增失败");
    assert_eq!(result.kpi.id, 6);
    assert!(result.persisted);
    assert!(result.warnings.is_empty());

    let stored = env.kpi_repo.load().expect("读取失败");
    assert_eq!(stored.len(), 6);
    assert_eq!(stored[5], result.kpi);

    let logs = env.action_log_repo.find_by_kpi_id(6).expect("查询日志失败");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action_type, "CREATE_KPI");
    assert_eq!(logs[0].actor, TEST_OPERATOR);
    let payload = logs[0].payload_json.as_ref().expect("缺少payload");
    assert_eq!(payload["after"]["name"], "Timesheet Compliance");
}

#[test]
fn test_update_只改权重() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut draft = env.kpi_api.get(3).expect("查询失败").fields();
    draft.weight = 30;
    let result = env.kpi_api.update(3, draft, TEST_OPERATOR).expect("修改失败");

    assert_eq!(result.kpi.id, 3);
    assert_eq!(result.kpi.name, "Site Visits Completed");
    assert_eq!(env.kpi_api.summary().expect("查询失败").total_weight, 110);

    let logs = env.action_log_repo.find_by_kpi_id(3).expect("查询日志失败");
    let payload = logs[0].payload_json.as_ref().expect("缺少payload");
    assert_eq!(payload["before"]["weight"], 20);
    assert_eq!(payload["after"]["weight"], 30);
}

#[test]
fn test_update_不存在时无修改() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let before = env.kpi_api.list().expect("查询失败");

    let err = env
        .kpi_api
        .update(99, valid_draft("Ghost"), TEST_OPERATOR)
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(env.kpi_api.list().expect("查询失败"), before);
    assert!(env.action_log_repo.find_by_kpi_id(99).expect("查询日志失败").is_empty());
}

#[test]
fn test_delete_后ID不复用() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.kpi_api.delete(5, TEST_OPERATOR).expect("删除失败");
    let created = env
        .kpi_api
        .create(valid_draft("Replacement"), TEST_OPERATOR)
        .expect("新增失败");
    assert_eq!(created.kpi.id, 6);

    let ids: Vec<i64> = env.kpi_api.list().expect("查询失败").iter().map(|k| k.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 6]);
}

#[test]
fn test_request_delete_确认后删除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let outcome = env
        .kpi_api
        .request_delete(2, &|_msg: &str| true, TEST_OPERATOR)
        .expect("删除失败");
    assert!(matches!(outcome, DeleteOutcome::Deleted { ref kpi } if kpi.id == 2));

    let summary = env.kpi_api.summary().expect("查询失败");
    assert_eq!(summary.total_count, 4);
    assert_eq!(summary.total_weight, 80);
    assert_eq!(env.kpi_repo.count().expect("统计失败"), 4);

    let logs = env.action_log_repo.find_by_kpi_id(2).expect("查询日志失败");
    assert_eq!(logs[0].action_type_kind(), Some(ActionType::DeleteKpi));
}

#[test]
fn test_request_delete_取消后无修改() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let outcome = env
        .kpi_api
        .request_delete(2, &|_msg: &str| false, TEST_OPERATOR)
        .expect("调用失败");
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(env.kpi_api.summary().expect("查询失败").total_count, 5);
    assert_eq!(env.kpi_repo.count().expect("统计失败"), 5);
}

// ==========================================
// 编辑会话测试
// ==========================================

#[test]
fn test_save_edit_新增流程() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.kpi_api.open_add().expect("打开失败");
    env.kpi_api
        .edit_draft(|d| *d = valid_draft("Training Hours"))
        .expect("编辑失败");

    // 保存前不落库
    assert_eq!(env.kpi_repo.count().expect("统计失败"), 5);

    let result = env.kpi_api.save_edit(TEST_OPERATOR).expect("保存失败");
    assert_eq!(result.kpi.id, 6);
    assert!(!env.kpi_api.edit_session().expect("查询失败").is_editing());
    assert_eq!(env.kpi_repo.count().expect("统计失败"), 6);
}

#[test]
fn test_save_edit_编辑流程保持ID() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let draft = env.kpi_api.open_edit(4).expect("打开失败");
    assert_eq!(draft.name, "Budget Utilization");

    env.kpi_api
        .edit_draft(|d| {
            d.name = "Budget Variance".to_string();
            d.weight = 25;
        })
        .expect("编辑失败");

    // 草稿是暂存的
    assert_eq!(env.kpi_api.get(4).expect("查询失败").name, "Budget Utilization");

    let result = env.kpi_api.save_edit(TEST_OPERATOR).expect("保存失败");
    assert_eq!(result.kpi.id, 4);
    assert_eq!(result.kpi.name, "Budget Variance");

    let stored = env.kpi_repo.load().expect("读取失败");
    assert_eq!(stored[3].name, "Budget Variance");
    assert_eq!(stored[3].weight, 25);
}

#[test]
fn test_cancel_edit_丢弃草稿() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let before = env.kpi_api.list().expect("查询失败");

    env.kpi_api.open_edit(1).expect("打开失败");
    env.kpi_api.edit_draft(|d| d.weight = 0).expect("编辑失败");
    env.kpi_api.cancel_edit().expect("取消失败");

    assert_eq!(env.kpi_api.list().expect("查询失败"), before);
    assert!(matches!(
        env.kpi_api.save_edit(TEST_OPERATOR),
        Err(ApiError::NoActiveEdit)
    ));
}

#[test]
fn test_open_edit_不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    assert!(env.kpi_api.open_edit(77).unwrap_err().is_not_found());
    assert_eq!(env.kpi_api.current_draft().expect("查询失败"), None);
}

// ==========================================
// 校验模式测试
// ==========================================

#[test]
fn test_宽松模式_接受非法草稿并返回警告() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut draft = valid_draft("");
    draft.weight = -5;
    let result = env.kpi_api.create(draft, TEST_OPERATOR).expect("新增失败");

    assert_eq!(result.kpi.name, "");
    assert_eq!(result.kpi.weight, -5);
    let types: Vec<&str> = result
        .warnings
        .iter()
        .map(|w| w.violation_type.as_str())
        .collect();
    assert_eq!(types, vec!["EMPTY_NAME", "WEIGHT_OUT_OF_RANGE"]);
}

#[test]
fn test_严格模式_拒绝非法草稿() {
    let env = ApiTestEnv::with_settings(KpiApiSettings {
        validation_mode: ValidationMode::Strict,
        ..KpiApiSettings::default()
    })
    .expect("无法创建测试环境");

    let mut draft = valid_draft("Over Weighted");
    draft.weight = 101;
    match env.kpi_api.create(draft, TEST_OPERATOR) {
        Err(ApiError::DraftValidationError { violations, .. }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "weight");
        }
        other => panic!("Expected DraftValidationError, got {:?}", other),
    }

    assert_eq!(env.kpi_repo.count().expect("统计失败"), 5);
    assert_eq!(env.action_log_repo.count().expect("统计失败"), 1);
}

// ==========================================
// 计分卡测试
// ==========================================

#[test]
fn test_scorecard_缺少实测值() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut measurements = HashMap::new();
    measurements.insert(1, KpiMeasurement { score: 95.0, target: 90.0 });
    measurements.insert(2, KpiMeasurement { score: 60.0, target: 80.0 });

    let card = env
        .kpi_api
        .scorecard(KpiRole::FieldEngineer, &measurements)
        .expect("计算失败");

    assert_eq!(card.entries.len(), 2);
    assert_eq!(card.missing, vec![3, 5]);
    assert_eq!(card.met_count(), 1);
    let expected = (95.0 * 25.0 + 60.0 * 20.0) / 45.0;
    let overall = card.overall_score.expect("应有综合得分");
    assert!((overall - expected).abs() < 1e-9);
}
