use std::sync::Arc;

use lambda_http::{run, service_fn, Error};

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let state = Arc::new(marlow_shared::init_state().await);

    run(service_fn(move |event| {
        let state = state.clone();
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
