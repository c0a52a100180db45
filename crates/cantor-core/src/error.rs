use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// The stored record was modified after the caller read it.
    #[error("stale write: {entity} {id} was changed by another writer")]
    StaleWrite { entity: &'static str, id: String },

    /// The update carries exactly the values already stored.
    #[error("no change: {entity} {id} already holds these values")]
    NoChange { entity: &'static str, id: String },

    #[error("duplicate {field}: {value:?} is already in use")]
    Duplicate { field: &'static str, value: String },
}

impl Error {
    /// Returns `true` when the error came from the backing store itself.
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Returns `true` when the caller should reload and re-apply its edit.
    pub fn is_stale_write(&self) -> bool {
        matches!(self, Self::StaleWrite { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let stale = Error::StaleWrite {
            entity: "hymn",
            id: "7".to_string(),
        };
        assert!(stale.is_stale_write());
        assert!(!stale.is_data_access());

        let db = Error::Database(rusqlite::Error::QueryReturnedNoRows);
        assert!(db.is_data_access());
        assert!(!db.is_stale_write());
    }

    #[test]
    fn test_only_store_failures_are_data_access() {
        let from_store: Error = rusqlite::Error::InvalidQuery.into();
        assert!(from_store.is_data_access());

        let domain = [
            Error::NotFound { entity: "hymn", id: "1".to_string() },
            Error::StaleWrite { entity: "hymn", id: "1".to_string() },
            Error::NoChange { entity: "hymn", id: "1".to_string() },
            Error::Duplicate { field: "name_kr", value: "주".to_string() },
        ];
        assert!(domain.iter().all(|err| !err.is_data_access()));
    }

    #[test]
    fn test_error_display() {
        let dup = Error::Duplicate {
            field: "name_jp",
            value: "Amazing".to_string(),
        };
        assert_eq!(dup.to_string(), "duplicate name_jp: \"Amazing\" is already in use");
    }
}
