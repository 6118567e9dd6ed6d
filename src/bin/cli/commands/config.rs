//! Configuration management commands.
//!
//! Initialization, validation, and printing defaults.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use taxon_rs::core::config::TaxonConfig;

use crate::cli::args::{InitConfigArgs, ValidateConfigArgs};
use crate::cli::config_builder::load_configuration;

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default taxon configuration".dimmed());
    println!("{}", "# Save this to taxon.yml and customize as needed".dimmed());
    println!();

    let yaml_output = serde_yaml::to_string(&TaxonConfig::default())?;
    println!("{}", yaml_output);
    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Configuration file already exists: {}. Use --force to overwrite or choose a different name with --output",
            args.output.display()
        ));
    }

    let yaml_content = serde_yaml::to_string(&TaxonConfig::default())?;
    tokio::fs::write(&args.output, yaml_content).await?;

    println!(
        "{} {}",
        "Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "Next steps:".bright_blue().bold());
    println!("   1. List your solutions (tag and object name prefix) under `solutions`");
    println!("   2. Adjust the allow-list under `taxonomy.namespaces`");
    println!(
        "   3. Set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_KEY, then run {}",
        "taxon classify <roots>".cyan()
    );
    Ok(())
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Validate a taxon configuration file
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = match load_configuration(Some(&args.file)).await {
        Ok(config) => {
            println!("{}", "Configuration file is valid".bright_green().bold());
            config
        }
        Err(e) => {
            eprintln!("{} {:#}", "Configuration validation failed:".red(), e);
            return Err(e);
        }
    };

    let solutions: Vec<String> = config
        .solutions
        .iter()
        .map(|s| format!("{} ({}*)", s.tag, s.prefix))
        .collect();
    let rows = vec![
        SettingRow {
            setting: "solutions".to_string(),
            value: solutions.join(", "),
        },
        SettingRow {
            setting: "taxonomy.namespaces".to_string(),
            value: config.taxonomy.namespaces.len().to_string(),
        },
        SettingRow {
            setting: "rules.name_markers".to_string(),
            value: config.rules.name_markers.len().to_string(),
        },
        SettingRow {
            setting: "oracle.provider".to_string(),
            value: config.oracle.provider.as_str().to_string(),
        },
        SettingRow {
            setting: "oracle.max_concurrency".to_string(),
            value: config.oracle.max_concurrency.to_string(),
        },
        SettingRow {
            setting: "ledger.path".to_string(),
            value: config.ledger.path.display().to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    if args.details {
        println!();
        println!("{}", "Allow-list".bright_blue().bold());
        for entry in &config.taxonomy.namespaces {
            println!("   {:<18} {}", entry.name, entry.description.dimmed());
        }
        println!();
        println!("{}", "Name markers".bright_blue().bold());
        for rule in &config.rules.name_markers {
            let overrides: Vec<String> = rule
                .solution_overrides
                .iter()
                .map(|(tag, namespace)| format!("{tag} -> {namespace}"))
                .collect();
            println!("   {:<8} {} {}", rule.marker, rule.namespace, overrides.join(", ").dimmed());
        }
    }
    Ok(())
}
