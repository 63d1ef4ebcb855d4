// roadcall-client/examples/submit_report.rs
// Submit a canned fault report against a running reports API.

use roadcall_client::{SubmissionClient, SubmissionResult};
use shared::models::{EncodedRaster, ReportFields, ReportPayload};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    // ROADCALL_API_URL must be set; a missing endpoint is a startup error.
    let client = match SubmissionClient::from_env() {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("{err}");
            return Err(err.into());
        }
    };

    let payload = ReportPayload::new(
        ReportFields {
            owner_name: "John Doe".to_string(),
            phone_number: "(555) 123-4567".to_string(),
            license_plate: "ABC-123".to_string(),
            fault_description: "Loud clunking noise from front suspension over bumps."
                .to_string(),
        },
        None,
        vec![],
        EncodedRaster::new("data:image/png;base64,iVBORw0KGgo="),
        EncodedRaster::new("data:image/png;base64,iVBORw0KGgo="),
    );

    match client.submit(&payload).await {
        SubmissionResult::Success { message, report_id } => {
            tracing::info!(report_id = ?report_id, "{message}");
        }
        SubmissionResult::Failure { message } => {
            tracing::error!("Submission failed: {message}");
        }
    }

    Ok(())
}
