pub mod types;

use marlow_atoms::store::DynamoStore;

/// Per-invocation shared state: the record store the whole request tree
/// borrows.
pub struct AppState {
    pub store: DynamoStore,
}

/// Build the application state from the lambda environment.
/// `TABLE_NAME` selects the single DynamoDB table, default "marlow".
pub async fn init_state() -> AppState {
    let config = aws_config::load_from_env().await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&config);
    let table_name = std::env::var("TABLE_NAME").unwrap_or_else(|_| "marlow".to_string());

    tracing::info!("record store ready (table: {})", table_name);
    AppState {
        store: DynamoStore::new(dynamo_client, table_name),
    }
}
