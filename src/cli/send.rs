use crate::error::Result;
use crate::forward::LogForwarder;
use crate::types::LogRequest;

/// Execute the `send` command: post one event and print the router's answer.
pub async fn execute(
    url: &str,
    level: &str,
    message: &str,
    details: Option<&str>,
    source: &str,
) -> Result<()> {
    let forwarder = LogForwarder::new(url, source);
    let request = LogRequest::new(level, message, details.unwrap_or(message), source);

    let response = forwarder.send(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
