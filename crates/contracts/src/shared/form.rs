//! Описание полей форм создания/редактирования записей

/// Тип поля формы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Выбор из фиксированного списка: (значение, подпись)
    Select(&'static [(&'static str, &'static str)]),
    /// Хранится в форме как "true"/"false"
    Checkbox,
}

/// Описание одного поля формы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    pub const fn text(key: &'static str, label: &'static str, required: bool) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            required,
        }
    }

    pub const fn number(key: &'static str, label: &'static str, required: bool) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Number,
            required,
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        options: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Select(options),
            required: true,
        }
    }

    pub const fn checkbox(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Checkbox,
            required: false,
        }
    }
}

/// Форма с сырыми строковыми значениями, которые UI читает и пишет по ключу
pub trait FormFields: Clone + Default + PartialEq + Send + Sync + 'static {
    fn fields() -> &'static [FieldDef];

    fn get(&self, key: &str) -> String;

    /// Неизвестный ключ игнорируется
    fn set(&mut self, key: &str, value: String);

    /// Пустая форма для создания: списки выбора стоят на первом варианте,
    /// как их показывает `<select>`
    fn for_create() -> Self {
        let mut form = Self::default();
        for field in Self::fields() {
            if let FieldKind::Select(options) = field.kind {
                if form.get(field.key).is_empty() {
                    if let Some((value, _)) = options.first() {
                        form.set(field.key, value.to_string());
                    }
                }
            }
        }
        form
    }

    /// Подписи обязательных полей, оставленных пустыми
    fn missing_required(&self) -> Vec<&'static str> {
        Self::fields()
            .iter()
            .filter(|f| f.required && self.get(f.key).trim().is_empty())
            .map(|f| f.label)
            .collect()
    }
}

/// "true"/"on"/"1"/"yes" считаются включённым флажком
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}
