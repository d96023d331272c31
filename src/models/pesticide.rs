//! 农药标签用量记录

use serde::{Deserialize, Serialize};

/// 标准背负式喷雾器的水量（升）
pub const PUMP_VOLUME_LITRES: f64 = 10.0;

/// 经过校验的农药记录
///
/// `pump_dose` 为每 10 升水（一泵）的制剂用量，保留两位小数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PesticideRecord {
    pub chemical_name: String,
    pub crop: String,
    pub pest: String,
    pub formulation_dose: f64,
    pub water_volume: f64,
    pub pump_dose: f64,
}

impl PesticideRecord {
    /// 一行摘要，用于提示词和界面展示
    pub fn summary(&self) -> String {
        format!(
            "{} ({} - {}): {} per {} L water = {} per 10-litre pump",
            self.chemical_name,
            self.crop,
            self.pest,
            self.formulation_dose,
            self.water_volume,
            self.pump_dose
        )
    }
}

/// 表格中的一行：记录 + 是否选中（默认不选）
#[derive(Debug, Clone, PartialEq)]
pub struct PesticideRow {
    pub record: PesticideRecord,
    pub selected: bool,
}

/// 农药用量表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PesticideTable {
    rows: Vec<PesticideRow>,
}

impl PesticideTable {
    pub fn from_records(records: Vec<PesticideRecord>) -> Self {
        Self {
            rows: records
                .into_iter()
                .map(|record| PesticideRow {
                    record,
                    selected: false,
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[PesticideRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 设置某一行的选中状态；越界返回 `false`
    pub fn set_selected(&mut self, index: usize, selected: bool) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.selected = selected;
                true
            }
            None => false,
        }
    }

    /// 已选中的记录（保持表格顺序）
    pub fn selected(&self) -> Vec<&PesticideRecord> {
        self.rows
            .iter()
            .filter(|row| row.selected)
            .map(|row| &row.record)
            .collect()
    }
}
