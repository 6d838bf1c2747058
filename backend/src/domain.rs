use std::sync::Arc;

use shared::{strip_id, EntityKind, EntitySchema, Fields, Record};
use tracing::info;

use crate::db::{Contains, DocumentStore, FindMany, StoreError};

/// Most records returned by a plain list
pub const LIST_LIMIT: u32 = 100;

/// Most records returned by a search
pub const SEARCH_LIMIT: u32 = 10;

/// Record operations for the one collection this server is configured with.
/// Client-supplied ids never reach the store; updates replace every field.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
    schema: &'static EntitySchema,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>, schema: &'static EntitySchema) -> Self {
        Self { store, schema }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub async fn create(&self, fields: Fields) -> Result<Record, StoreError> {
        let record = self.store.create(self.schema.collection, strip_id(fields)).await?;
        info!("Created record {} in '{}'", record.id, self.schema.collection);
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<Record>, StoreError> {
        self.store
            .find_many(self.schema.collection, &FindMany::take(LIST_LIMIT))
            .await
    }

    /// Case-insensitive substring search on the schema's search field,
    /// sorted ascending by that field. Empty terms match everything.
    pub async fn search(&self, terms: &str) -> Result<Vec<Record>, StoreError> {
        let field = self.schema.search_field.to_string();
        let query = FindMany {
            contains: Some(Contains {
                field: field.clone(),
                needle: terms.to_string(),
            }),
            order_by: Some(field),
            take: SEARCH_LIMIT,
        };
        self.store.find_many(self.schema.collection, &query).await
    }

    pub async fn update(&self, id: &str, fields: Fields) -> Result<Record, StoreError> {
        let record = self
            .store
            .update(self.schema.collection, id, strip_id(fields))
            .await?;
        info!("Updated record {} in '{}'", id, self.schema.collection);
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<Record, StoreError> {
        let record = self.store.delete(self.schema.collection, id).await?;
        info!("Deleted record {} from '{}'", id, self.schema.collection);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use serde_json::{json, Value};
    use shared::EntityKind;

    async fn setup_service(kind: EntityKind) -> RecordService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        RecordService::new(Arc::new(db), kind.schema())
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().expect("object literal")
    }

    #[tokio::test]
    async fn test_create_discards_client_id() {
        let service = setup_service(EntityKind::Cats).await;

        let record = service
            .create(fields(json!({"id": "client-chosen", "name": "Tom"})))
            .await
            .unwrap();

        assert_ne!(record.id, "client-chosen");
        assert!(!record.fields.contains_key("id"));
    }

    #[tokio::test]
    async fn test_list_is_capped() {
        let service = setup_service(EntityKind::Cats).await;
        for i in 0..(LIST_LIMIT + 5) {
            service.create(fields(json!({"name": format!("cat {}", i)}))).await.unwrap();
        }

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), LIST_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_search_uses_schema_field_and_cap() {
        let service = setup_service(EntityKind::Recipes).await;
        for i in 0..15 {
            service
                .create(fields(json!({"title": format!("Soup {:02}", i), "type": "meal"})))
                .await
                .unwrap();
        }
        service.create(fields(json!({"title": "Lemonade", "type": "drink"}))).await.unwrap();

        let soups = service.search("SOUP").await.unwrap();
        assert_eq!(soups.len(), SEARCH_LIMIT as usize);
        assert_eq!(soups[0].text("title"), "Soup 00");
        assert_eq!(soups[9].text("title"), "Soup 09");

        let everything = service.search("").await.unwrap();
        assert_eq!(everything.len(), SEARCH_LIMIT as usize);
        assert_eq!(everything[0].text("title"), "Lemonade");
    }

    #[tokio::test]
    async fn test_update_ignores_body_id() {
        let service = setup_service(EntityKind::Cats).await;
        let created = service.create(fields(json!({"name": "Tom"}))).await.unwrap();

        let updated = service
            .update(&created.id, fields(json!({"id": "other", "name": "Tommy"})))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.fields, fields(json!({"name": "Tommy"})));
    }
}
