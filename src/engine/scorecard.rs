// ==========================================
// 绩效监测平台 - 绩效计分卡
// ==========================================
// 职责: 按 KPI 权重汇总员工得分，判断各项是否达标
// 输入: 适用于该角色的 KPI 定义 + 各 KPI 实测得分/目标
// 输出: 计分卡明细 + 加权综合得分
// ==========================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::kpi::Kpi;

/// 单项 KPI 实测值（0-100 分制）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiMeasurement {
    pub score: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardEntry {
    pub kpi_id: i64,
    pub name: String,
    pub weight: i32,
    pub score: f64,
    pub target: f64,
    pub target_met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub entries: Vec<ScorecardEntry>,
    /// 加权综合得分; 有效权重合计为0时为 None
    pub overall_score: Option<f64>,
    /// 有定义但无实测值的 KPI
    pub missing: Vec<i64>,
}

impl Scorecard {
    pub fn met_count(&self) -> usize {
        self.entries.iter().filter(|e| e.target_met).count()
    }
}

// ==========================================
// ScorecardEngine - 计分卡引擎
// ==========================================
// 红线: 无状态引擎,所有方法都是纯函数
pub struct ScorecardEngine;

impl ScorecardEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算计分卡
    ///
    /// # 参数
    /// - `kpis`: 适用的 KPI 定义（顺序即明细顺序）
    /// - `measurements`: KPI id → 实测值
    ///
    /// # 说明
    /// 综合得分 = Σ(得分 × 权重) / Σ(权重)，只计入权重为正的已实测 KPI
    pub fn evaluate(
        &self,
        kpis: &[Kpi],
        measurements: &HashMap<i64, KpiMeasurement>,
    ) -> Scorecard {
        let mut entries = Vec::with_capacity(kpis.len());
        let mut missing = Vec::new();
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;

        for kpi in kpis {
            let Some(m) = measurements.get(&kpi.id) else {
                missing.push(kpi.id);
                continue;
            };

            if kpi.weight > 0 {
                weighted_sum += m.score * f64::from(kpi.weight);
                weight_sum += f64::from(kpi.weight);
            }

            entries.push(ScorecardEntry {
                kpi_id: kpi.id,
                name: kpi.name.clone(),
                weight: kpi.weight,
                score: m.score,
                target: m.target,
                target_met: m.score >= m.target,
            });
        }

        let overall_score = if weight_sum > 0.0 {
            Some(weighted_sum / weight_sum)
        } else {
            None
        };

        Scorecard {
            entries,
            overall_score,
            missing,
        }
    }
}

impl Default for ScorecardEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kpi::sample_kpis;

    fn m(score: f64, target: f64) -> KpiMeasurement {
        KpiMeasurement { score, target }
    }

    #[test]
    fn test_weighted_overall_score() {
        let kpis = sample_kpis();
        let measurements: HashMap<i64, KpiMeasurement> = [
            (1, m(92.0, 90.0)),
            (2, m(95.0, 95.0)),
            (3, m(78.0, 85.0)),
            (4, m(85.0, 90.0)),
            (5, m(88.0, 85.0)),
        ]
        .into_iter()
        .collect();

        let card = ScorecardEngine::new().evaluate(&kpis, &measurements);
        // (92*25 + 95*20 + 78*20 + 85*15 + 88*20) / 100 = 87.95
        let overall = card.overall_score.unwrap();
        assert!((overall - 87.95).abs() < 1e-9);
        assert_eq!(card.entries.len(), 5);
        assert_eq!(card.met_count(), 3);
        assert!(card.missing.is_empty());
    }

    #[test]
    fn test_missing_measurements_excluded() {
        let kpis = sample_kpis();
        let measurements: HashMap<i64, KpiMeasurement> =
            [(1, m(80.0, 90.0)), (5, m(100.0, 85.0))].into_iter().collect();

        let card = ScorecardEngine::new().evaluate(&kpis, &measurements);
        assert_eq!(card.missing, vec![2, 3, 4]);
        // (80*25 + 100*20) / 45
        let expected = (80.0 * 25.0 + 100.0 * 20.0) / 45.0;
        assert!((card.overall_score.unwrap() - expected).abs() < 1e-9);
        assert!(!card.entries[0].target_met);
        assert!(card.entries[1].target_met);
    }

    #[test]
    fn test_zero_weight_yields_no_overall() {
        let mut kpis = sample_kpis();
        kpis.truncate(1);
        kpis[0].weight = 0;
        let measurements: HashMap<i64, KpiMeasurement> = [(1, m(50.0, 40.0))].into_iter().collect();

        let card = ScorecardEngine::new().evaluate(&kpis, &measurements);
        assert_eq!(card.overall_score, None);
        assert_eq!(card.entries.len(), 1);
    }
}
