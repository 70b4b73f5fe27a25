use anyhow::Context;

use cooperation_classifier::{app::ComponentRegistry, config::Config, observability};

fn main() -> anyhow::Result<()> {
    observability::install_panic_hook();

    // Tracing initialization is handled by Telemetry::new()
    let config = Config::from_env().context("failed to load configuration")?;
    let registry = ComponentRegistry::build(config).context("failed to build component registry")?;
    let summary = registry.run()?;

    let report = &summary.report;
    let score = &report.evaluation.score;
    println!("records loaded:        {}", report.total_records);
    println!("cooperation records:   {}", report.filtered.len());
    println!("undated records:       {}", report.trend.undated);
    println!("model diversity:       {:.4}", score.model_diversity);
    println!("institution diversity: {:.4}", score.institution_diversity);
    println!("continuity score:      {:.4}", score.continuity_score);
    println!("implementation score:  {:.4}", score.implementation_score);
    println!(
        "results written to {}",
        registry.config().output_dir().display()
    );

    Ok(())
}
