//! Basic usage: construct a client, ship a few logs, flush, and close.
use logcourier::{Client, ClientConfig, LogLevel};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut global_metadata = serde_json::Map::new();
    global_metadata.insert("deployment".into(), "us-east-1".into());

    let config = ClientConfig::new("https://logs.example.com", "api-key")
        .with_batch_size(50)
        .with_flush_interval_ms(2000)
        .with_max_retries(3)
        .with_global_metadata(global_metadata);

    let client = Client::new(config)?;

    client.info("checkout-service", "order placed")?;
    client.debug("checkout-service", "cart contents validated")?;

    if let Err(err) = "not-a-number".parse::<u32>() {
        client.error("checkout-service", "discount calculation failed", &err)?;
    }

    client.trace_context().set(Some("request-abc123".into()));
    client.warn("checkout-service", "inventory running low")?;
    client.log("checkout-service", LogLevel::Critical, "payment gateway unreachable")?;
    client.trace_context().set(None);

    client.flush(None).await?;
    client.close().await;

    println!("metrics: {:?}", client.metrics());
    Ok(())
}
