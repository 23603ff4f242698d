//! Gravity task overview
//!
//! Lists the caller's Gravity tasks with crawler progress, then prints the
//! remaining credits from the billing service.
//!
//! ## Run
//! ```bash
//! export GRAVITY_API_KEY="your-key"
//! cargo run --example gravity_tasks
//! ```

use macrocosmos::prelude::*;
use macrocosmos::proto::gravity::GetGravityTasksRequest;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let gravity = GravityClient::from_env()?;

    let tasks = gravity
        .get_gravity_tasks(GetGravityTasksRequest {
            include_crawlers: true,
            ..Default::default()
        })
        .await?;

    for task in &tasks.gravity_task_states {
        println!("{} [{}] {}", task.gravity_task_id, task.status, task.name);
        for crawler in &task.crawler_workflows {
            let topic = crawler
                .criteria
                .as_ref()
                .map(|c| format!("{}:{}", c.platform, c.topic))
                .unwrap_or_default();
            let (status, records) = crawler
                .state
                .as_ref()
                .map(|s| (s.status.as_str(), s.records_collected))
                .unwrap_or(("unknown", 0));
            println!("  {} {topic} {status} {records} records", crawler.crawler_id);
        }
    }

    let billing = BillingClient::builder().build()?;
    let usage = billing.get_usage(Some("gravity".to_string())).await?;
    println!("usage: {usage:?}");
    Ok(())
}
