//! Profile form example binary
//!
//! Demonstrates tracking a save mutation through its lifecycle.

use metrics_exporter_prometheus::PrometheusBuilder;
use mutation_state_runtime::metrics::describe_metrics;
use profile_form::{ProfileForm, ProfileUpdate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_form=info,mutation_state_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Install a Prometheus recorder and describe the lifecycle metrics
    let metrics = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();

    println!("=== Profile Form Example: Mutation Lifecycle ===\n");

    let form = ProfileForm::attach();
    println!("Initial status: {}", form.status_line());

    println!("\n>>> Saving a valid profile");
    let version = form
        .save(ProfileUpdate::new("ada", "ada@example.com"))?
        .await?;
    println!("Saved version: {version:?}");
    println!("Status: {}", form.status_line());

    println!("\n>>> Saving an invalid email");
    let version = form
        .save(ProfileUpdate::new("ada", "ada-at-example"))?
        .await?;
    println!("Returned: {version:?} (failure absorbed)");
    println!("Status: {}", form.status_line());

    println!("\n>>> Dismissing the error");
    form.dismiss();
    println!("Status: {}", form.status_line());

    println!("\nRendered frames:");
    for frame in form.frames() {
        println!("  • {frame}");
    }

    form.detach();

    println!("\nRecorded metrics:");
    for line in metrics.render().lines() {
        if line.starts_with("mutation_") {
            println!("  {line}");
        }
    }

    println!("\n=== Lifecycle Demonstration Complete ===");
    Ok(())
}
