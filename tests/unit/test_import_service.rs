//! Unit tests for the import reconciliation service.

use diagram_import_api::api::models::{
    DiagramColumn, DiagramRelation, DiagramTable, ImportPayload, Project, RelationType,
};
use diagram_import_api::api::services::import_service::{self, ImportError};
use diagram_import_api::api::storage::{SchemaStore, SqliteSchemaStore};

async fn setup() -> (SqliteSchemaStore, Project) {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = Project::new("Demo".to_string(), None, None);
    store.create_project(&project).await.unwrap();
    (store, project)
}

fn column(name: &str, column_type: Option<&str>, is_primary_key: bool) -> DiagramColumn {
    DiagramColumn {
        name: name.to_string(),
        column_type: column_type.map(str::to_string),
        is_primary_key,
    }
}

fn table(name: &str, columns: Vec<DiagramColumn>) -> DiagramTable {
    DiagramTable {
        name: name.to_string(),
        columns,
    }
}

fn relation(
    from_table: &str,
    from_column: &str,
    to_table: &str,
    to_column: &str,
) -> DiagramRelation {
    DiagramRelation {
        from_table: from_table.to_string(),
        from_column: from_column.to_string(),
        to_table: to_table.to_string(),
        to_column: to_column.to_string(),
        relation_type: RelationType::ManyToOne,
    }
}

/// Orders/Customers payload with one resolvable relation.
fn orders_payload() -> ImportPayload {
    ImportPayload {
        tables: vec![
            table(
                "Orders",
                vec![
                    column("id", Some("INT"), true),
                    column("customer_id", Some("INT"), false),
                ],
            ),
            table("Customers", vec![column("id", Some("INT"), true)]),
        ],
        relations: vec![relation("Orders", "customer_id", "Customers", "id")],
    }
}

#[tokio::test]
async fn test_import_reports_inserted_counts() {
    let (store, project) = setup().await;

    let summary = import_service::import_payload(&store, &project, orders_payload())
        .await
        .unwrap();

    assert_eq!(summary.models, 2);
    assert_eq!(summary.columns, 3);
    assert_eq!(summary.relations, 1);
    assert_eq!(summary.skipped_relations, 0);

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].reference_name, "orders");
    assert_eq!(models[0].display_name, "Orders");
    assert_eq!(models[1].reference_name, "customers");

    let columns = store.list_columns(project.id).await.unwrap();
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0].reference_name, "id");
    assert!(columns[0].is_pk);
    assert!(!columns[0].not_null);
    assert_eq!(columns[1].reference_name, "customer_id");

    let relations = store.list_relations(project.id).await.unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].join_type, RelationType::ManyToOne);
    assert_eq!(relations[0].from_column_id, columns[1].id);
    assert_eq!(relations[0].to_column_id, columns[2].id);
}

#[tokio::test]
async fn test_unresolved_relation_is_skipped_not_errored() {
    let (store, project) = setup().await;
    let mut payload = orders_payload();
    payload.relations = vec![
        relation("Orders", "customer_id", "Suppliers", "id"),
        relation("Orders", "no_such_column", "Customers", "id"),
    ];

    let summary = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();

    assert_eq!(summary.relations, 0);
    assert_eq!(summary.skipped_relations, 2);
    assert!(store.list_relations(project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_payload_rejected() {
    let (store, project) = setup().await;
    let err = import_service::import_payload(&store, &project, ImportPayload::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::NoTables));
}

#[tokio::test]
async fn test_blank_table_name_rejected() {
    let (store, project) = setup().await;
    let payload = ImportPayload {
        tables: vec![table("   ", vec![])],
        relations: vec![],
    };
    let err = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingTableName));
}

#[tokio::test]
async fn test_duplicate_table_name_rejects_without_writing() {
    let (store, project) = setup().await;
    import_service::import_payload(&store, &project, orders_payload())
        .await
        .unwrap();

    let payload = ImportPayload {
        tables: vec![table("Users", vec![]), table("Users", vec![])],
        relations: vec![],
    };
    let err = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::DuplicateTableName(ref name) if name == "Users"));

    // The failed import must not have touched the previous schema
    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].display_name, "Orders");
}

#[tokio::test]
async fn test_duplicate_column_sources_first_wins() {
    let (store, project) = setup().await;
    let payload = ImportPayload {
        tables: vec![table(
            "Users",
            vec![
                column("email", Some("VARCHAR(255)"), false),
                column("email", Some("TEXT"), false),
            ],
        )],
        relations: vec![],
    };

    let summary = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();
    assert_eq!(summary.columns, 1);

    let columns = store.list_columns(project.id).await.unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column_type, "VARCHAR(255)");
}

#[tokio::test]
async fn test_blank_column_names_skipped() {
    let (store, project) = setup().await;
    let payload = ImportPayload {
        tables: vec![table(
            "Users",
            vec![column("  ", Some("INT"), false), column("id", Some("INT"), true)],
        )],
        relations: vec![],
    };

    let summary = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();
    assert_eq!(summary.columns, 1);
}

#[tokio::test]
async fn test_model_reference_names_collision_resolved() {
    let (store, project) = setup().await;
    let payload = ImportPayload {
        tables: vec![table("User Info", vec![]), table("User-Info", vec![])],
        relations: vec![],
    };

    import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models[0].reference_name, "user_info");
    assert_eq!(models[1].reference_name, "user_info_2");
    assert_eq!(models[0].display_name, "User Info");
    assert_eq!(models[1].display_name, "User-Info");
}

#[tokio::test]
async fn test_missing_column_type_defaults_to_unknown() {
    let (store, project) = setup().await;
    let payload = ImportPayload {
        tables: vec![table(
            "Users",
            vec![column("id", None, true), column("note", Some("  "), false)],
        )],
        relations: vec![],
    };

    import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();

    let columns = store.list_columns(project.id).await.unwrap();
    assert_eq!(columns[0].column_type, import_service::UNKNOWN_TYPE);
    assert_eq!(columns[1].column_type, import_service::UNKNOWN_TYPE);
}

#[tokio::test]
async fn test_relation_names_concatenate_and_suffix() {
    let (store, project) = setup().await;
    let mut payload = orders_payload();
    // Same endpoints twice: the second name collides and gets suffixed
    payload
        .relations
        .push(relation("Orders", "customer_id", "Customers", "id"));
    payload.relations[1].relation_type = RelationType::OneToOne;

    import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();

    let relations = store.list_relations(project.id).await.unwrap();
    assert_eq!(relations.len(), 2);
    assert_eq!(relations[0].name, "OrdersCustomer_idCustomersId");
    assert_eq!(relations[1].name, "OrdersCustomer_idCustomersId_2");
}

#[tokio::test]
async fn test_project_schema_and_catalog_recorded_on_models() {
    let store = SqliteSchemaStore::in_memory().unwrap();
    let project = Project::new(
        "Warehouse".to_string(),
        Some("public".to_string()),
        Some("main".to_string()),
    );
    store.create_project(&project).await.unwrap();

    import_service::import_payload(&store, &project, orders_payload())
        .await
        .unwrap();

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models[0].properties["table"], "Orders");
    assert_eq!(models[0].properties["schema"], "public");
    assert_eq!(models[0].properties["catalog"], "main");
    assert_eq!(models[0].source_table_name, "Orders");
}

#[tokio::test]
async fn test_models_without_project_schema_omit_it() {
    let (store, project) = setup().await;
    import_service::import_payload(&store, &project, orders_payload())
        .await
        .unwrap();

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models[0].properties["table"], "Orders");
    assert!(models[0].properties.get("schema").is_none());
    assert!(models[0].properties.get("catalog").is_none());
}

#[tokio::test]
async fn test_reimport_replaces_prior_schema() {
    let (store, project) = setup().await;
    import_service::import_payload(&store, &project, orders_payload())
        .await
        .unwrap();

    let payload = ImportPayload {
        tables: vec![table("Products", vec![column("sku", Some("TEXT"), true)])],
        relations: vec![],
    };
    let summary = import_service::import_payload(&store, &project, payload)
        .await
        .unwrap();
    assert_eq!(summary.models, 1);

    let models = store.list_models(project.id).await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].display_name, "Products");
    let columns = store.list_columns(project.id).await.unwrap();
    assert_eq!(columns.len(), 1);
    assert!(store.list_relations(project.id).await.unwrap().is_empty());
}
