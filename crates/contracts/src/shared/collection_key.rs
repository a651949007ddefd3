use serde::{Deserialize, Serialize};

/// Коллекции админки
///
/// Единственное место, где живут ключи localStorage и имена REST-ресурсов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKey {
    Units,
    Properties,
    Agents,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 3] = [
        CollectionKey::Units,
        CollectionKey::Properties,
        CollectionKey::Agents,
    ];

    /// Ключ в локальном хранилище браузера
    pub fn storage_key(&self) -> &'static str {
        match self {
            CollectionKey::Units => "estate_admin.units",
            CollectionKey::Properties => "estate_admin.properties",
            CollectionKey::Agents => "estate_admin.agents",
        }
    }

    /// Имя ресурса в REST API и в именах файлов экспорта
    pub fn resource(&self) -> &'static str {
        match self {
            CollectionKey::Units => "units",
            CollectionKey::Properties => "properties",
            CollectionKey::Agents => "agents",
        }
    }

    /// Заголовок списка для UI
    pub fn title(&self) -> &'static str {
        match self {
            CollectionKey::Units => "Units",
            CollectionKey::Properties => "Properties",
            CollectionKey::Agents => "Agents",
        }
    }

    /// `/api/<resource>`
    pub fn api_path(&self) -> String {
        format!("/api/{}", self.resource())
    }

    pub fn from_resource(resource: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.resource() == resource)
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_storage_keys_are_distinct() {
        let keys: HashSet<_> = CollectionKey::ALL.iter().map(|k| k.storage_key()).collect();
        assert_eq!(keys.len(), CollectionKey::ALL.len());
    }

    #[test]
    fn test_resource_round_trip() {
        for key in CollectionKey::ALL {
            assert_eq!(CollectionKey::from_resource(key.resource()), Some(key));
        }
        assert_eq!(CollectionKey::from_resource("leads"), None);
        assert_eq!(CollectionKey::Properties.api_path(), "/api/properties");
    }
}
