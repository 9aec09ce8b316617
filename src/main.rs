use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = gemini_chat::logging::init();

    if let Err(err) = gemini_chat::run().await {
        tracing::error!(error = %format!("{err:#}"), "gemini-chat failed to start or serve");
        return Err(err);
    }
    Ok(())
}
