// src/model/column.rs
//! Column catalog for the two detail datasets.
//!
//! The catalog is the only source of column identifiers that may reach SQL.
//! Each entry carries a display label, the semantic type the predicate
//! compiler switches on, and a display unit (`%` marks 0–1 fractions that
//! are shown as percentages).

use serde::{Deserialize, Serialize};

/// Semantic type of a physical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Date,
    Boolean,
}

impl ColumnType {
    /// SQLite storage type for the schema.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text | ColumnType::Date => "TEXT",
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Float => "REAL",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

/// Aggregation unit of a dataset: one row per building or one row per area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Building,
    Area,
}

impl Unit {
    /// Physical table holding this unit's rows.
    pub fn table_name(&self) -> &'static str {
        match self {
            Unit::Building => "data_set_detail_buildings",
            Unit::Area => "data_set_detail_areas",
        }
    }

    /// Display columns for this unit.
    pub fn columns(&self) -> &'static [ColumnMeta] {
        match self {
            Unit::Building => BUILDING_COLUMNS,
            Unit::Area => AREA_COLUMNS,
        }
    }

    /// Look up a display column by physical name.
    pub fn column(&self, name: &str) -> Option<&'static ColumnMeta> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Whether `name` is a column of this unit's table, display or structural.
    pub fn has_column(&self, name: &str) -> bool {
        STRUCTURAL_COLUMNS.contains(&name) || self.column(name).is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Building => "building",
            Unit::Area => "area",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row key used for ordering and cursoring.
pub const ID_COLUMN: &str = "id";
/// Scope column tying a row to one estimation run.
pub const RESULT_ID_COLUMN: &str = "data_set_result_id";
/// ISO-8601 date (`YYYY-MM-DD`) the estimate refers to.
pub const REFERENCE_DATE_COLUMN: &str = "reference_date";
/// Area name a row belongs to.
pub const AREA_GROUP_COLUMN: &str = "area_group";

/// Columns every detail table has regardless of unit.
pub const STRUCTURAL_COLUMNS: &[&str] = &[
    ID_COLUMN,
    RESULT_ID_COLUMN,
    REFERENCE_DATE_COLUMN,
    AREA_GROUP_COLUMN,
];

/// Metadata for one displayable column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Display unit; empty when unitless.
    pub unit: &'static str,
    /// Whether group conditions may bucket this column.
    pub groupable: bool,
}

impl ColumnMeta {
    const fn new(
        name: &'static str,
        label: &'static str,
        column_type: ColumnType,
        unit: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            column_type,
            unit,
            groupable: true,
        }
    }

    /// Stored as a 0–1 fraction, displayed as a percentage.
    pub fn is_percent(&self) -> bool {
        self.unit == "%"
    }
}

// Catalog entries. Units follow the display conventions of the desktop app.
use self::ColumnType::{Boolean, Date, Float, Integer, Text};

pub static AREA_COLUMNS: &[ColumnMeta] = &[
    ColumnMeta::new("area", "地域面積", Float, "m^2"),
    ColumnMeta::new("area_group", "地域名称", Text, ""),
    ColumnMeta::new("reference_date", "推定日", Date, ""),
    ColumnMeta::new("young_population_ratio", "若年層率（15歳以下人口）", Float, "%"),
    ColumnMeta::new("elderly_population_ratio", "高齢者率（65歳以上人口）", Float, "%"),
    ColumnMeta::new("total_building_count", "住宅数", Integer, "棟"),
    ColumnMeta::new("predicted_probability", "推定空き家割合", Float, "%"),
    ColumnMeta::new("vacant_house_count", "推定空き家数", Integer, "棟"),
];

pub static BUILDING_COLUMNS: &[ColumnMeta] = &[
    ColumnMeta::new("area_group", "地域名称", Text, ""),
    ColumnMeta::new("normalized_address", "正規化住所", Text, ""),
    ColumnMeta::new("household_code", "世帯コード", Text, ""),
    ColumnMeta::new("reference_date", "推定日", Date, ""),
    ColumnMeta::new("household_size", "世帯人数", Integer, "人"),
    ColumnMeta::new("members_under_15", "15歳未満人数", Integer, "人"),
    ColumnMeta::new("members_15_to_64", "15歳以上64歳以下人数", Integer, "人"),
    ColumnMeta::new("percentage_under_15", "15歳未満構成比", Float, "%"),
    ColumnMeta::new("percentage_15_to_64", "15歳以上64歳以下構成比", Float, "%"),
    ColumnMeta::new("members_over_65", "65歳以上人数", Integer, "人"),
    ColumnMeta::new("percentage_over_65", "65歳以上構成比", Float, "%"),
    ColumnMeta::new("predicted_probability", "空き家推定確率", Float, "%"),
    ColumnMeta::new("predicted_label", "空き家推定結果", Boolean, ""),
    ColumnMeta::new("gender_ratio", "男女比", Float, ""),
    ColumnMeta::new("water_disconnection_flag", "閉栓フラグ", Boolean, ""),
    ColumnMeta::new("max_water_usage", "最大使用水量", Integer, "L"),
    ColumnMeta::new("avg_water_usage", "平均使用水量", Integer, "L"),
    ColumnMeta::new("min_water_usage", "最小使用水量", Integer, "L"),
    ColumnMeta::new("total_water_usage", "合計使用水量", Integer, "L"),
    ColumnMeta::new("water_supply_number", "水道番号", Text, ""),
    ColumnMeta::new("water_supply_source_info", "水道名寄せ元情報", Text, ""),
    ColumnMeta::new("structure_name", "構造名称", Text, ""),
    ColumnMeta::new("registration_date", "登記日付", Date, ""),
    ColumnMeta::new("registration_source_info", "登記名寄せ元情報", Text, ""),
    ColumnMeta::new("vacant_house_id", "空き家調査ID", Text, ""),
    ColumnMeta::new("vacant_house_address", "空き家調査住所", Text, ""),
    ColumnMeta::new("measuredheight", "標高", Integer, "m"),
    ColumnMeta::new("rank", "洪水浸水想定区域　浸水ランク", Integer, ""),
    ColumnMeta::new("depth", "洪水浸水想定区域　浸水深", Integer, "m"),
    ColumnMeta::new("duration", "洪水浸水想定区域　継続時間", Integer, "時間"),
    ColumnMeta::new("floors_above_ground", "地上階数", Integer, "階"),
    ColumnMeta::new("name", "名称", Text, ""),
    ColumnMeta::new("floors_below_ground", "地下階数", Integer, "階"),
    ColumnMeta::new("inland_flooding_risk_rank", "内水浸水リスクランク", Integer, ""),
    ColumnMeta::new("inland_flooding_risk_depth", "内水氾濫リスク深さ", Integer, "m"),
    ColumnMeta::new("landslide_risk_desc", "土砂災害リスク　現象区分", Text, ""),
    ColumnMeta::new("river_flooding_risk_desc", "指定河川名称", Text, ""),
    ColumnMeta::new("river_flooding_risk_rank", "浸水ランク", Integer, ""),
    ColumnMeta::new("river_flooding_risk_depth", "浸水深", Integer, "m"),
];
