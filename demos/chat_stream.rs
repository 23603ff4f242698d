//! Streaming chat completion
//!
//! Streams an Apex chat completion to stdout while a tee'd copy is written
//! to `chat.jsonl` as JSON lines.
//!
//! ## Setup
//! ```bash
//! export APEX_API_KEY="your-key"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example chat_stream
//! ```

use futures::StreamExt;
use macrocosmos::prelude::*;
use macrocosmos::telemetry;
use tokio::io::AsyncWriteExt;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let _guard = telemetry::init_from_env()?;

    let client = ApexClient::builder().app_name("chat-stream-demo").build()?;

    let request = ChatCompletionRequest {
        messages: vec![
            ChatMessage::system("You are a concise assistant."),
            ChatMessage::user("Write a haiku about decentralised compute."),
        ],
        ..Default::default()
    };

    let mut stream = client.chat_completion_stream(request).await?;
    let (mut display, mut archive) = stream.tee()?;

    let mut reader = archive.byte_reader()?;
    let writer = tokio::spawn(async move {
        let mut file = tokio::fs::File::create("chat.jsonl").await?;
        tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await
    });

    let mut chunks = display.stream()?;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        print!("{}", chunk.delta_text());
        std::io::Write::flush(&mut std::io::stdout())?;
        if let Some(reason) = chunk.finish_reason() {
            println!("\n[finish: {reason}]");
        }
    }

    writer.await??;
    println!("chunks saved to chat.jsonl");
    Ok(())
}
