use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::{Identifiable, Record, RecordMetadata, SortValue};
use crate::shared::collection_key::CollectionKey;
use crate::shared::export::Exportable;
use crate::shared::form::{FieldDef, FormFields};
use crate::shared::numbers::{coerce_number, coerce_optional_int, format_grouped, format_plain};

// ============================================================================
// Status
// ============================================================================

/// Статус продажи юнита
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum UnitStatus {
    #[default]
    Available,
    Booked,
    Sold,
    Hold,
    /// Значение, пришедшее из источника и не известное этой версии.
    /// Записывается обратно без изменений.
    Other(String),
}

pub const UNIT_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("available", "Available"),
    ("booked", "Booked"),
    ("sold", "Sold"),
    ("hold", "On hold"),
];

impl UnitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Booked => "booked",
            UnitStatus::Sold => "sold",
            UnitStatus::Hold => "hold",
            UnitStatus::Other(raw) => raw,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "available" => Some(UnitStatus::Available),
            "booked" => Some(UnitStatus::Booked),
            "sold" => Some(UnitStatus::Sold),
            "hold" => Some(UnitStatus::Hold),
            _ => None,
        }
    }
}

impl From<String> for UnitStatus {
    fn from(value: String) -> Self {
        UnitStatus::parse(&value).unwrap_or(UnitStatus::Other(value))
    }
}

impl From<UnitStatus> for String {
    fn from(status: UnitStatus) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// Record
// ============================================================================

/// Юнит (квартира/офис) в составе проекта застройщика
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,

    #[serde(flatten)]
    pub metadata: RecordMetadata,

    #[serde(default)]
    pub unit_no: String,
    #[serde(default)]
    pub project_name: String,
    /// Например "2BHK", "Studio", "Office"
    #[serde(default)]
    pub unit_type: String,
    #[serde(default)]
    pub floor: Option<i64>,
    #[serde(default)]
    pub area_sqft: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: UnitStatus,

    /// Поля источника, которых нет в этой версии; хранятся как есть
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identifiable for Unit {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Unit {
    type Form = UnitForm;

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut RecordMetadata {
        &mut self.metadata
    }

    fn to_form(&self) -> UnitForm {
        UnitForm {
            unit_no: self.unit_no.clone(),
            project_name: self.project_name.clone(),
            unit_type: self.unit_type.clone(),
            floor: self.floor.map(|f| f.to_string()).unwrap_or_default(),
            area_sqft: format_plain(self.area_sqft),
            price: format_plain(self.price),
            status: self.status.as_str().to_string(),
        }
    }

    fn apply_form(&mut self, form: &UnitForm) {
        self.unit_no = form.unit_no.trim().to_string();
        self.project_name = form.project_name.trim().to_string();
        self.unit_type = form.unit_type.trim().to_string();
        self.floor = coerce_optional_int(&form.floor);
        self.area_sqft = coerce_number(&form.area_sqft);
        self.price = coerce_number(&form.price);
        if let Some(status) = UnitStatus::parse(&form.status) {
            self.status = status;
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.unit_no.trim().is_empty() {
            return Err("Unit number is required".into());
        }
        if self.price < 0.0 {
            return Err("Price cannot be negative".into());
        }
        if self.area_sqft < 0.0 {
            return Err("Area cannot be negative".into());
        }
        Ok(())
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.unit_no, self.project_name, self.unit_type)
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn set_status(&mut self, key: &str) -> Result<(), String> {
        self.status = UnitStatus::parse(key).ok_or_else(|| format!("Unknown unit status: {}", key))?;
        Ok(())
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "unitNo" => self.unit_no.clone(),
            "projectName" => self.project_name.clone(),
            "unitType" => self.unit_type.clone(),
            "floor" => self.floor.map(|f| f.to_string()).unwrap_or_else(|| "-".into()),
            "areaSqft" => format_grouped(self.area_sqft),
            "price" => format_grouped(self.price),
            "status" => self.status_label().to_string(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "unitNo" => SortValue::text(&self.unit_no),
            "projectName" => SortValue::text(&self.project_name),
            "unitType" => SortValue::text(&self.unit_type),
            "floor" => self
                .floor
                .map(|f| SortValue::Number(f as f64))
                .unwrap_or(SortValue::Empty),
            "areaSqft" => SortValue::Number(self.area_sqft),
            "price" => SortValue::Number(self.price),
            "status" => SortValue::text(self.status.as_str()),
            _ => self.metadata.sort_value(key),
        }
    }

    fn blank(id: String, metadata: RecordMetadata) -> Self {
        Self {
            id,
            metadata,
            unit_no: String::new(),
            project_name: String::new(),
            unit_type: String::new(),
            floor: None,
            area_sqft: 0.0,
            price: 0.0,
            status: UnitStatus::Available,
            extra: Map::new(),
        }
    }

    fn collection() -> CollectionKey {
        CollectionKey::Units
    }

    fn element_name() -> &'static str {
        "Unit"
    }

    fn status_options() -> &'static [(&'static str, &'static str)] {
        UNIT_STATUS_OPTIONS
    }

    fn columns() -> &'static [(&'static str, &'static str)] {
        &[
            ("unitNo", "Unit No"),
            ("projectName", "Project"),
            ("unitType", "Type"),
            ("floor", "Floor"),
            ("areaSqft", "Area, sqft"),
            ("price", "Price"),
            ("status", "Status"),
        ]
    }

    fn demo_records() -> Vec<Self> {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let unit = |id: &str, unit_no: &str, unit_type: &str, floor: i64, area: f64, price: f64, status| Unit {
            id: id.to_string(),
            metadata: RecordMetadata::new_at(at),
            unit_no: unit_no.to_string(),
            project_name: "Skyline Residency".to_string(),
            unit_type: unit_type.to_string(),
            floor: Some(floor),
            area_sqft: area,
            price,
            status,
            extra: Map::new(),
        };
        vec![
            unit("demo-unit-1", "A-101", "2BHK", 1, 1150.0, 8_500_000.0, UnitStatus::Available),
            unit("demo-unit-2", "A-504", "3BHK", 5, 1620.0, 12_400_000.0, UnitStatus::Booked),
            unit("demo-unit-3", "B-1202", "Penthouse", 12, 2890.0, 26_000_000.0, UnitStatus::Hold),
        ]
    }
}

impl Exportable for Unit {
    fn headers() -> Vec<&'static str> {
        vec![
            "id",
            "unitNo",
            "projectName",
            "unitType",
            "floor",
            "areaSqft",
            "price",
            "status",
            "createdAt",
            "updatedAt",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.unit_no.clone(),
            self.project_name.clone(),
            self.unit_type.clone(),
            self.floor.map(|f| f.to_string()).unwrap_or_default(),
            format_plain(self.area_sqft),
            format_plain(self.price),
            self.status.as_str().to_string(),
            self.metadata.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.metadata.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }
}

// ============================================================================
// Form
// ============================================================================

/// Форма создания/редактирования юнита
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitForm {
    pub unit_no: String,
    pub project_name: String,
    pub unit_type: String,
    pub floor: String,
    pub area_sqft: String,
    pub price: String,
    pub status: String,
}

impl FormFields for UnitForm {
    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::text("unitNo", "Unit No", true),
            FieldDef::text("projectName", "Project", false),
            FieldDef::text("unitType", "Type", false),
            FieldDef::number("floor", "Floor", false),
            FieldDef::number("areaSqft", "Area, sqft", false),
            FieldDef::number("price", "Price", true),
            FieldDef::select("status", "Status", UNIT_STATUS_OPTIONS),
        ];
        FIELDS
    }

    fn get(&self, key: &str) -> String {
        match key {
            "unitNo" => self.unit_no.clone(),
            "projectName" => self.project_name.clone(),
            "unitType" => self.unit_type.clone(),
            "floor" => self.floor.clone(),
            "areaSqft" => self.area_sqft.clone(),
            "price" => self.price.clone(),
            "status" => self.status.clone(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "unitNo" => self.unit_no = value,
            "projectName" => self.project_name = value,
            "unitType" => self.unit_type = value,
            "floor" => self.floor = value,
            "areaSqft" => self.area_sqft = value,
            "price" => self.price = value,
            "status" => self.status = value,
            _ => {}
        }
    }
}
