//! Deep research job with polling
//!
//! Submits a deep researcher job, then polls until it reaches a terminal
//! state, printing new result chunks as they arrive.
//!
//! ## Run
//! ```bash
//! export APEX_API_KEY="your-key"
//! cargo run --example deep_research
//! ```

use std::time::Duration;

use macrocosmos::prelude::*;
use macrocosmos::telemetry;

const POLL_INTERVAL: Duration = Duration::from_secs(20);
const MAX_POLLS: usize = 90;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let _guard = telemetry::init_from_env()?;

    let client = ApexClient::from_env()?;
    let research = client.deep_research();

    let params = DeepResearchJobParams::new(vec![ChatMessage::user(
        "Summarise recent progress in decentralised model training.",
    )]);
    let job = research.create_job(params).await?;
    println!("job {} submitted ({})", job.job_id, job.status);

    let mut last_seq_id = -1;
    for _ in 0..MAX_POLLS {
        tokio::time::sleep(POLL_INTERVAL).await;
        let update = research.get_job_results(&job.job_id).await?;

        for chunk in update.chunks_after(last_seq_id) {
            if let Some(content) = chunk.content() {
                println!("[{}] {content}", chunk.seq_id);
            }
            last_seq_id = chunk.seq_id;
        }

        match update.job_status() {
            JobStatus::Completed => {
                if let Some(answer) = update.final_answer() {
                    println!("\nfinal answer:\n{answer}");
                }
                return Ok(());
            }
            JobStatus::Failed => {
                let reason = update.error.unwrap_or_else(|| "unknown error".to_string());
                return Err(format!("job failed: {reason}").into());
            }
            status => println!("status: {status:?}"),
        }
    }

    Err("job did not finish in time".into())
}
