//! SN13 topics and on-demand data
//!
//! ## Run
//! ```bash
//! export MACROCOSMOS_API_KEY="your-key"
//! cargo run --example list_topics
//! ```

use macrocosmos::prelude::*;
use macrocosmos::proto::sn13::OnDemandDataRequest;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let client = Sn13Client::builder().app_name("list-topics-demo").build()?;

    let topics = client.list_topics("reddit").await?;
    for detail in topics.details.iter().take(10) {
        println!(
            "{:<40} {:>12} bytes",
            detail.label_value, detail.content_size_bytes
        );
    }

    let validation = client.validate_reddit_topic("r/rust").await?;
    println!("r/rust: {validation:?}");

    let data = client
        .on_demand_data(OnDemandDataRequest {
            source: "x".to_string(),
            keywords: vec!["bittensor".to_string()],
            limit: Some(5),
            ..Default::default()
        })
        .await?;
    println!("on-demand status: {} ({} records)", data.status, data.data.len());
    Ok(())
}
