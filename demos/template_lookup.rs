//! Template Lookup Example
//!
//! A slow, trusted template lookup is being replaced by a faster one that is
//! still wrong about 10% of the time. The experiment keeps serving the old
//! answer while `TracingPublisher` logs every comparison.
//!
//! Run with: RUST_LOG=info cargo run --example template_lookup

use std::thread;
use std::time::Duration;

use experimentalist::{Context, Experiment, TracingPublisher};
use rand::Rng;
use tracing_subscriber::EnvFilter;

const RUNS: usize = 20;

fn lookup_original() -> Result<bool, String> {
    thread::sleep(Duration::from_millis(rand::thread_rng().gen_range(5..150)));
    Ok(true)
}

fn lookup_replacement() -> Result<bool, String> {
    let mut rng = rand::thread_rng();
    thread::sleep(Duration::from_millis(rng.gen_range(5..75)));
    Ok(rng.gen_range(0..100) >= 10)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Experimentalist: Template Lookup ===\n");

    let experiment = Experiment::on(lookup_original)
        .trial(lookup_replacement)
        .called("template-lookup")
        .context(|| Context::from([("host".to_string(), serde_json::json!("demo"))]))
        .parallel(true)
        .publish(TracingPublisher);

    let mut served = 0;
    for _ in 0..RUNS {
        // Callers only ever see the original lookup's answer
        if experiment.run()? {
            served += 1;
        }
    }

    println!("\nServed {served}/{RUNS} templates from the original lookup");
    Ok(())
}
