use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::{Identifiable, Record, RecordMetadata, SortValue};
use crate::shared::collection_key::CollectionKey;
use crate::shared::export::Exportable;
use crate::shared::form::{parse_flag, FieldDef, FormFields};
use crate::shared::numbers::{coerce_int, coerce_number, format_grouped, format_plain};

// ============================================================================
// Status
// ============================================================================

/// Статус объявления об объекте
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PropertyStatus {
    #[default]
    ForSale,
    ForRent,
    Sold,
    Rented,
    /// Неизвестный статус источника, хранится без изменений
    Other(String),
}

pub const PROPERTY_STATUS_OPTIONS: &[(&str, &str)] = &[
    ("for_sale", "For sale"),
    ("for_rent", "For rent"),
    ("sold", "Sold"),
    ("rented", "Rented"),
];

pub const PROPERTY_TYPE_OPTIONS: &[(&str, &str)] = &[
    ("apartment", "Apartment"),
    ("villa", "Villa"),
    ("plot", "Plot"),
    ("commercial", "Commercial"),
];

impl PropertyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyStatus::ForSale => "for_sale",
            PropertyStatus::ForRent => "for_rent",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
            PropertyStatus::Other(raw) => raw,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "for_sale" => Some(PropertyStatus::ForSale),
            "for_rent" => Some(PropertyStatus::ForRent),
            "sold" => Some(PropertyStatus::Sold),
            "rented" => Some(PropertyStatus::Rented),
            _ => None,
        }
    }
}

impl From<String> for PropertyStatus {
    fn from(value: String) -> Self {
        PropertyStatus::parse(&value).unwrap_or(PropertyStatus::Other(value))
    }
}

impl From<PropertyStatus> for String {
    fn from(status: PropertyStatus) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// Record
// ============================================================================

/// Объект недвижимости в каталоге агентства
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,

    #[serde(flatten)]
    pub metadata: RecordMetadata,

    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub bedrooms: i64,
    #[serde(default)]
    pub bathrooms: i64,
    #[serde(default)]
    pub area_sqft: f64,
    #[serde(default)]
    pub status: PropertyStatus,
    /// Показывать на главной странице сайта
    #[serde(default)]
    pub featured: bool,
    /// Ссылка на агента (a003), без проверки целостности
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Поля источника, неизвестные этой версии
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identifiable for Property {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Property {
    type Form = PropertyForm;

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut RecordMetadata {
        &mut self.metadata
    }

    fn to_form(&self) -> PropertyForm {
        PropertyForm {
            title: self.title.clone(),
            location: self.location.clone(),
            property_type: self.property_type.clone(),
            price: format_plain(self.price),
            bedrooms: self.bedrooms.to_string(),
            bathrooms: self.bathrooms.to_string(),
            area_sqft: format_plain(self.area_sqft),
            status: self.status.as_str().to_string(),
            featured: self.featured.to_string(),
            agent_id: self.agent_id.clone().unwrap_or_default(),
        }
    }

    fn apply_form(&mut self, form: &PropertyForm) {
        self.title = form.title.trim().to_string();
        self.location = form.location.trim().to_string();
        self.property_type = form.property_type.trim().to_string();
        self.price = coerce_number(&form.price);
        self.bedrooms = coerce_int(&form.bedrooms);
        self.bathrooms = coerce_int(&form.bathrooms);
        self.area_sqft = coerce_number(&form.area_sqft);
        if let Some(status) = PropertyStatus::parse(&form.status) {
            self.status = status;
        }
        self.featured = parse_flag(&form.featured);
        let agent = form.agent_id.trim();
        self.agent_id = if agent.is_empty() {
            None
        } else {
            Some(agent.to_string())
        };
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".into());
        }
        if self.location.trim().is_empty() {
            return Err("Location is required".into());
        }
        if self.price < 0.0 {
            return Err("Price cannot be negative".into());
        }
        if self.bedrooms < 0 || self.bathrooms < 0 {
            return Err("Room counts cannot be negative".into());
        }
        Ok(())
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.location, self.property_type)
    }

    fn status_key(&self) -> &str {
        self.status.as_str()
    }

    fn set_status(&mut self, key: &str) -> Result<(), String> {
        self.status =
            PropertyStatus::parse(key).ok_or_else(|| format!("Unknown property status: {}", key))?;
        Ok(())
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "location" => self.location.clone(),
            "propertyType" => self.property_type.clone(),
            "price" => format_grouped(self.price),
            "bedrooms" => self.bedrooms.to_string(),
            "areaSqft" => format_grouped(self.area_sqft),
            "status" => self.status_label().to_string(),
            "featured" => (if self.featured { "★" } else { "" }).to_string(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "title" => SortValue::text(&self.title),
            "location" => SortValue::text(&self.location),
            "propertyType" => SortValue::text(&self.property_type),
            "price" => SortValue::Number(self.price),
            "bedrooms" => SortValue::Number(self.bedrooms as f64),
            "areaSqft" => SortValue::Number(self.area_sqft),
            "status" => SortValue::text(self.status.as_str()),
            "featured" => SortValue::Number(if self.featured { 1.0 } else { 0.0 }),
            _ => self.metadata.sort_value(key),
        }
    }

    fn blank(id: String, metadata: RecordMetadata) -> Self {
        Self {
            id,
            metadata,
            title: String::new(),
            location: String::new(),
            property_type: String::new(),
            price: 0.0,
            bedrooms: 0,
            bathrooms: 0,
            area_sqft: 0.0,
            status: PropertyStatus::ForSale,
            featured: false,
            agent_id: None,
            extra: Map::new(),
        }
    }

    fn collection() -> CollectionKey {
        CollectionKey::Properties
    }

    fn element_name() -> &'static str {
        "Property"
    }

    fn status_options() -> &'static [(&'static str, &'static str)] {
        PROPERTY_STATUS_OPTIONS
    }

    fn columns() -> &'static [(&'static str, &'static str)] {
        &[
            ("title", "Title"),
            ("location", "Location"),
            ("propertyType", "Type"),
            ("bedrooms", "Beds"),
            ("areaSqft", "Area, sqft"),
            ("price", "Price"),
            ("status", "Status"),
            ("featured", "Featured"),
        ]
    }

    fn demo_records() -> Vec<Self> {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let mut base = Property::blank(String::new(), RecordMetadata::new_at(at));
        base.agent_id = Some("demo-agent-1".to_string());

        vec![
            Property {
                id: "demo-property-1".into(),
                title: "Sea-view apartment".into(),
                location: "Bandra West, Mumbai".into(),
                property_type: "apartment".into(),
                price: 42_000_000.0,
                bedrooms: 3,
                bathrooms: 3,
                area_sqft: 1850.0,
                featured: true,
                ..base.clone()
            },
            Property {
                id: "demo-property-2".into(),
                title: "Garden villa".into(),
                location: "Whitefield, Bengaluru".into(),
                property_type: "villa".into(),
                price: 31_500_000.0,
                bedrooms: 4,
                bathrooms: 4,
                area_sqft: 3200.0,
                ..base.clone()
            },
            Property {
                id: "demo-property-3".into(),
                title: "High-street retail space".into(),
                location: "Connaught Place, Delhi".into(),
                property_type: "commercial".into(),
                price: 180_000.0,
                area_sqft: 900.0,
                status: PropertyStatus::ForRent,
                agent_id: Some("demo-agent-2".into()),
                ..base
            },
        ]
    }
}

impl Exportable for Property {
    fn headers() -> Vec<&'static str> {
        vec![
            "id",
            "title",
            "location",
            "propertyType",
            "price",
            "bedrooms",
            "bathrooms",
            "areaSqft",
            "status",
            "featured",
            "agentId",
            "createdAt",
            "updatedAt",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.location.clone(),
            self.property_type.clone(),
            format_plain(self.price),
            self.bedrooms.to_string(),
            self.bathrooms.to_string(),
            format_plain(self.area_sqft),
            self.status.as_str().to_string(),
            self.featured.to_string(),
            self.agent_id.clone().unwrap_or_default(),
            self.metadata.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.metadata.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }
}

// ============================================================================
// Form
// ============================================================================

/// Форма создания/редактирования объекта
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyForm {
    pub title: String,
    pub location: String,
    pub property_type: String,
    pub price: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub area_sqft: String,
    pub status: String,
    pub featured: String,
    pub agent_id: String,
}

impl FormFields for PropertyForm {
    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::text("title", "Title", true),
            FieldDef::text("location", "Location", true),
            FieldDef::select("propertyType", "Type", PROPERTY_TYPE_OPTIONS),
            FieldDef::number("price", "Price", true),
            FieldDef::number("bedrooms", "Bedrooms", false),
            FieldDef::number("bathrooms", "Bathrooms", false),
            FieldDef::number("areaSqft", "Area, sqft", false),
            FieldDef::select("status", "Status", PROPERTY_STATUS_OPTIONS),
            FieldDef::checkbox("featured", "Featured on home page"),
            FieldDef::text("agentId", "Agent ID", false),
        ];
        FIELDS
    }

    fn get(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "location" => self.location.clone(),
            "propertyType" => self.property_type.clone(),
            "price" => self.price.clone(),
            "bedrooms" => self.bedrooms.clone(),
            "bathrooms" => self.bathrooms.clone(),
            "areaSqft" => self.area_sqft.clone(),
            "status" => self.status.clone(),
            "featured" => self.featured.clone(),
            "agentId" => self.agent_id.clone(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "title" => self.title = value,
            "location" => self.location = value,
            "propertyType" => self.property_type = value,
            "price" => self.price = value,
            "bedrooms" => self.bedrooms = value,
            "bathrooms" => self.bathrooms = value,
            "areaSqft" => self.area_sqft = value,
            "status" => self.status = value,
            "featured" => self.featured = value,
            "agentId" => self.agent_id = value,
            _ => {}
        }
    }
}
