use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::{Identifiable, Record, RecordMetadata, SortValue};
use crate::shared::collection_key::CollectionKey;
use crate::shared::export::Exportable;
use crate::shared::form::{parse_flag, FieldDef, FormFields};
use crate::shared::numbers::coerce_int;

pub const AGENT_STATUS_OPTIONS: &[(&str, &str)] = &[("active", "Active"), ("inactive", "Inactive")];

/// Агент агентства недвижимости
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,

    #[serde(flatten)]
    pub metadata: RecordMetadata,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Например "Luxury residential", "Commercial leasing"
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub experience_years: i64,
    #[serde(default = "default_active")]
    pub active: bool,

    /// Поля источника, неизвестные этой версии
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl Identifiable for Agent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Agent {
    type Form = AgentForm;

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut RecordMetadata {
        &mut self.metadata
    }

    fn to_form(&self) -> AgentForm {
        AgentForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            specialization: self.specialization.clone(),
            experience_years: self.experience_years.to_string(),
            active: self.active.to_string(),
        }
    }

    fn apply_form(&mut self, form: &AgentForm) {
        self.name = form.name.trim().to_string();
        self.email = form.email.trim().to_lowercase();
        self.phone = form.phone.trim().to_string();
        self.specialization = form.specialization.trim().to_string();
        self.experience_years = coerce_int(&form.experience_years);
        self.active = parse_flag(&form.active);
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".into());
        }
        // Только грубая проверка, без RFC 5322
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err("Email looks invalid".into());
        }
        if self.experience_years < 0 {
            return Err("Experience cannot be negative".into());
        }
        Ok(())
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.email, self.phone, self.specialization
        )
    }

    fn status_key(&self) -> &str {
        if self.active {
            "active"
        } else {
            "inactive"
        }
    }

    fn set_status(&mut self, key: &str) -> Result<(), String> {
        match key.trim().to_lowercase().as_str() {
            "active" => self.active = true,
            "inactive" => self.active = false,
            other => return Err(format!("Unknown agent status: {}", other)),
        }
        Ok(())
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "specialization" => self.specialization.clone(),
            "experienceYears" => self.experience_years.to_string(),
            "status" => self.status_label().to_string(),
            _ => String::new(),
        }
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "name" => SortValue::text(&self.name),
            "email" => SortValue::text(&self.email),
            "phone" => SortValue::text(&self.phone),
            "specialization" => SortValue::text(&self.specialization),
            "experienceYears" => SortValue::Number(self.experience_years as f64),
            "status" => SortValue::text(self.status_key()),
            _ => self.metadata.sort_value(key),
        }
    }

    fn blank(id: String, metadata: RecordMetadata) -> Self {
        Self {
            id,
            metadata,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            specialization: String::new(),
            experience_years: 0,
            active: true,
            extra: Map::new(),
        }
    }

    fn collection() -> CollectionKey {
        CollectionKey::Agents
    }

    fn element_name() -> &'static str {
        "Agent"
    }

    fn status_options() -> &'static [(&'static str, &'static str)] {
        AGENT_STATUS_OPTIONS
    }

    fn columns() -> &'static [(&'static str, &'static str)] {
        &[
            ("name", "Name"),
            ("email", "Email"),
            ("phone", "Phone"),
            ("specialization", "Specialization"),
            ("experienceYears", "Experience, yrs"),
            ("status", "Status"),
        ]
    }

    fn demo_records() -> Vec<Self> {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 15, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        vec![
            Agent {
                id: "demo-agent-1".into(),
                metadata: RecordMetadata::new_at(at),
                name: "Priya Sharma".into(),
                email: "priya.sharma@example.com".into(),
                phone: "+91 98200 00001".into(),
                specialization: "Luxury residential".into(),
                experience_years: 9,
                active: true,
                extra: Map::new(),
            },
            Agent {
                id: "demo-agent-2".into(),
                metadata: RecordMetadata::new_at(at),
                name: "Arjun Mehta".into(),
                email: "arjun.mehta@example.com".into(),
                phone: "+91 98200 00002".into(),
                specialization: "Commercial leasing".into(),
                experience_years: 5,
                active: true,
                extra: Map::new(),
            },
        ]
    }
}

impl Exportable for Agent {
    fn headers() -> Vec<&'static str> {
        vec![
            "id",
            "name",
            "email",
            "phone",
            "specialization",
            "experienceYears",
            "active",
            "createdAt",
            "updatedAt",
        ]
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.specialization.clone(),
            self.experience_years.to_string(),
            self.active.to_string(),
            self.metadata.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.metadata.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
    }
}

/// Форма агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience_years: String,
    pub active: String,
}

impl Default for AgentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            specialization: String::new(),
            experience_years: String::new(),
            active: "true".to_string(),
        }
    }
}

impl FormFields for AgentForm {
    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::text("name", "Name", true),
            FieldDef::text("email", "Email", false),
            FieldDef::text("phone", "Phone", false),
            FieldDef::text("specialization", "Specialization", false),
            FieldDef::number("experienceYears", "Experience, yrs", false),
            FieldDef::checkbox("active", "Active"),
        ];
        FIELDS
    }

    fn get(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "specialization" => self.specialization.clone(),
            "experienceYears" => self.experience_years.clone(),
            "active" => self.active.clone(),
            _ => String::new(),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = value,
            "email" => self.email = value,
            "phone" => self.phone = value,
            "specialization" => self.specialization = value,
            "experienceYears" => self.experience_years = value,
            "active" => self.active = value,
            _ => {}
        }
    }
}
