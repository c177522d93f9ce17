//! Unit tests for the SQLite schema store.

use diagram_import_api::api::models::{Model, ModelColumn, Project, Relation, RelationType};
use diagram_import_api::api::storage::{SchemaStore, SqliteSchemaStore, StorageError};
use serde_json::json;
use uuid::Uuid;

fn sample_project() -> Project {
    Project::new(
        "Demo".to_string(),
        Some("public".to_string()),
        Some("main".to_string()),
    )
}

/// One model with one column, ready to insert for `project_id`.
fn sample_schema(project_id: Uuid) -> (Vec<Model>, Vec<ModelColumn>, Vec<Relation>) {
    let model = Model::new(
        project_id,
        "orders".to_string(),
        "Orders".to_string(),
        "Orders".to_string(),
        json!({ "table": "Orders" }),
    );
    let column = ModelColumn::new(
        model.id,
        "id".to_string(),
        "id".to_string(),
        "INT".to_string(),
        true,
    );
    (vec![model], vec![column], vec![])
}

#[tokio::test]
async fn test_create_and_get_project() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = sample_project();
    store.create_project(&project).await.unwrap();

    let loaded = store.get_project(project.id).await.unwrap();
    assert_eq!(loaded.id, project.id);
    assert_eq!(loaded.name, "Demo");
    assert_eq!(loaded.schema_name.as_deref(), Some("public"));
    assert_eq!(loaded.catalog_name.as_deref(), Some("main"));
}

#[tokio::test]
async fn test_get_missing_project_is_not_found() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let err = store.get_project(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { ref entity_type, .. } if entity_type == "project"));
}

#[tokio::test]
async fn test_list_projects_in_insertion_order() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    for name in ["first", "second", "third"] {
        let project = Project::new(name.to_string(), None, None);
        store.create_project(&project).await.unwrap();
    }

    let projects = store.list_projects().await.unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_replace_schema_and_read_back() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = sample_project();
    store.create_project(&project).await.unwrap();

    let orders = Model::new(
        project.id,
        "orders".to_string(),
        "Orders".to_string(),
        "Orders".to_string(),
        json!({ "table": "Orders", "schema": "public" }),
    );
    let customers = Model::new(
        project.id,
        "customers".to_string(),
        "Customers".to_string(),
        "Customers".to_string(),
        json!({ "table": "Customers" }),
    );
    let order_id = ModelColumn::new(
        orders.id,
        "id".to_string(),
        "id".to_string(),
        "INT".to_string(),
        true,
    );
    let customer_ref = ModelColumn::new(
        orders.id,
        "customer_id".to_string(),
        "customer_id".to_string(),
        "INT".to_string(),
        false,
    );
    let customer_id = ModelColumn::new(
        customers.id,
        "id".to_string(),
        "id".to_string(),
        "INT".to_string(),
        true,
    );
    let link = Relation::new(
        project.id,
        "OrdersCustomer_idCustomersId".to_string(),
        customer_ref.id,
        customer_id.id,
        RelationType::OneToMany,
    );

    store
        .replace_schema(
            project.id,
            &[orders.clone(), customers.clone()],
            &[order_id.clone(), customer_ref.clone(), customer_id.clone()],
            &[link.clone()],
        )
        .await
        .unwrap();

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, orders.id);
    assert_eq!(models[0].properties["schema"], "public");
    assert_eq!(models[1].id, customers.id);

    let columns = store.list_columns(project.id).await.unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0].id, order_id.id);
    assert!(columns[0].is_pk);
    assert!(!columns[0].not_null);
    assert_eq!(columns[1].id, customer_ref.id);
    assert_eq!(columns[2].model_id, customers.id);

    let relations = store.list_relations(project.id).await.unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].id, link.id);
    assert_eq!(relations[0].name, "OrdersCustomer_idCustomersId");
    assert_eq!(relations[0].from_column_id, customer_ref.id);
    assert_eq!(relations[0].to_column_id, customer_id.id);
    assert_eq!(relations[0].join_type, RelationType::OneToMany);
}

#[tokio::test]
async fn test_replace_schema_wipes_previous_rows() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = sample_project();
    store.create_project(&project).await.unwrap();

    let (models, columns, relations) = sample_schema(project.id);
    store
        .replace_schema(project.id, &models, &columns, &relations)
        .await
        .unwrap();

    let replacement = Model::new(
        project.id,
        "products".to_string(),
        "Products".to_string(),
        "Products".to_string(),
        json!({ "table": "Products" }),
    );
    store
        .replace_schema(project.id, &[replacement.clone()], &[], &[])
        .await
        .unwrap();

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id, replacement.id);
    assert!(store.list_columns(project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_schema_does_not_touch_other_projects() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let first = Project::new("first".to_string(), None, None);
    let second = Project::new("second".to_string(), None, None);
    store.create_project(&first).await.unwrap();
    store.create_project(&second).await.unwrap();

    let (models, columns, relations) = sample_schema(first.id);
    store
        .replace_schema(first.id, &models, &columns, &relations)
        .await
        .unwrap();
    let (models, columns, relations) = sample_schema(second.id);
    store
        .replace_schema(second.id, &models, &columns, &relations)
        .await
        .unwrap();

    assert_eq!(store.list_models(first.id).await.unwrap().len(), 1);
    assert_eq!(store.list_models(second.id).await.unwrap().len(), 1);
    assert_eq!(store.list_columns(first.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_replace_rolls_back_to_prior_schema() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = sample_project();
    store.create_project(&project).await.unwrap();

    let (models, columns, relations) = sample_schema(project.id);
    store
        .replace_schema(project.id, &models, &columns, &relations)
        .await
        .unwrap();

    // A column pointing at a model that is not part of the batch violates
    // the foreign key and must abort the whole replace
    let replacement = Model::new(
        project.id,
        "products".to_string(),
        "Products".to_string(),
        "Products".to_string(),
        json!({}),
    );
    let orphan = ModelColumn::new(
        Uuid::new_v4(),
        "sku".to_string(),
        "sku".to_string(),
        "TEXT".to_string(),
        false,
    );
    let err = store
        .replace_schema(project.id, &[replacement], &[orphan], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Other(_)));

    // Prior schema survives untouched
    let surviving = store.list_models(project.id).await.unwrap();
    assert_eq!(surviving.len(), 1);
    assert_eq!(surviving[0].id, models[0].id);
    assert_eq!(store.list_columns(project.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_on_disk_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("schemas.db");

    let project = sample_project();
    {
        let store = SqliteSchemaStore::new(&db_path).unwrap();
        store.create_project(&project).await.unwrap();
        let (models, columns, relations) = sample_schema(project.id);
        store
            .replace_schema(project.id, &models, &columns, &relations)
            .await
            .unwrap();
    }

    let reopened = SqliteSchemaStore::new(&db_path).unwrap();
    let loaded = reopened.get_project(project.id).await.unwrap();
    assert_eq!(loaded.name, "Demo");
    assert_eq!(reopened.list_models(project.id).await.unwrap().len(), 1);
    assert_eq!(reopened.list_columns(project.id).await.unwrap().len(), 1);
}
