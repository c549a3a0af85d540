#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use mybeerlog::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use mybeerlog::{
    ApiHandler, ApiReply, AppConfig, InMemoryBreweryStore, InMemoryVisitStore, SystemClock,
};
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use std::sync::Arc;

#[cfg(feature = "lambda")]
type LambdaHandler = ApiHandler<InMemoryBreweryStore, InMemoryVisitStore, SystemClock>;

#[cfg(feature = "lambda")]
async fn function_handler(
    handler: &LambdaHandler,
    event: LambdaEvent<Value>,
) -> Result<ApiReply, Error> {
    tracing::info!(request_id = %event.context.request_id, "Handling event");
    // 結構錯誤的 payload 由 handler 回 400，而非讓 runtime 回報反序列化失敗
    Ok(handler.handle_value(event.payload).await)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = AppConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
    logger::init_lambda_logger(config.log_level());

    config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    let breweries = InMemoryBreweryStore::with_breweries(
        config
            .seed_breweries()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?,
    );
    let visits = InMemoryVisitStore::new(Arc::new(SystemClock));
    let handler = ApiHandler::new(
        breweries,
        visits,
        SystemClock,
        config.checkin_radius_meters(),
    )
    .with_run_mode(config.app.run_mode.clone());
    tracing::info!(
        radius_meters = config.checkin_radius_meters(),
        "Check-in Lambda function ready"
    );

    let handler = &handler;
    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(handler, event).await
    }))
    .await
}
