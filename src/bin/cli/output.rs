//! Terminal display for classification results.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use taxon_rs::{ClassificationRun, NamespaceAssignment, NamespaceCensus, ReviewOutcome, RunSummary};

/// Row of the results table.
#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Solution")]
    solution: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn wrap(text: &str, width: usize) -> String {
    textwrap::wrap(text, width).join("\n")
}

fn colored_status(assignment: &NamespaceAssignment) -> String {
    let label = assignment.status_label();
    match label {
        "forced" => label.bright_blue().to_string(),
        "suggested" => label.green().to_string(),
        "invalid" => label.red().to_string(),
        _ => label.yellow().to_string(),
    }
}

/// Display the run counters.
pub fn display_run_summary(summary: &RunSummary, dry_run: bool) {
    let title = if dry_run {
        "Classification plan (dry run)"
    } else {
        "Classification complete"
    };
    println!("{}", title.bright_green().bold());
    println!("   Indexed objects:     {}", summary.indexed.to_string().cyan());
    println!("   Targets:             {}", summary.targets.to_string().cyan());
    println!("   Forced:              {}", summary.forced);
    println!("   From ledger:         {}", summary.skipped);
    if dry_run {
        println!("   Would query:         {}", summary.would_query.to_string().yellow());
    } else {
        println!("   Suggested:           {}", summary.suggested);
        if summary.invalid > 0 {
            println!("   Invalid labels:      {}", summary.invalid.to_string().red());
        }
        if summary.no_suggestion > 0 {
            println!("   Without suggestion:  {}", summary.no_suggestion.to_string().yellow());
        }
        println!("   Adjusted by group:   {}", summary.adjusted);
        println!("   Recorded:            {}", summary.recorded);
    }
    println!("   Elapsed:             {}ms", summary.elapsed_ms);
}

/// Display the objects decided in this run.
pub fn display_run(run: &ClassificationRun) {
    display_run_summary(&run.summary, run.dry_run);

    let rows: Vec<ObjectRow> = run
        .objects
        .iter()
        .filter(|object| !object.skipped || object.assignment.adjusted_from.is_some())
        .map(|object| ObjectRow {
            kind: object.record.kind.to_string(),
            name: object.record.name.clone(),
            solution: object.record.solution.clone().unwrap_or_default(),
            namespace: object.assignment.namespace.clone(),
            status: colored_status(&object.assignment),
            reason: wrap(&object.assignment.reason, 60),
        })
        .collect();

    if rows.is_empty() {
        return;
    }
    println!();
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);
}

/// Display a single-object review.
pub fn display_review(outcome: &ReviewOutcome) {
    let record = &outcome.record;
    let assignment = &outcome.assignment;

    println!(
        "{} {} {}",
        record.kind.to_string().dimmed(),
        record.name.bright_cyan().bold(),
        format!("({})", record.source_location.display()).dimmed()
    );
    println!("   Group:        {}", outcome.group);
    println!(
        "   Namespace:    {} [{}]",
        assignment.namespace.bold(),
        colored_status(assignment)
    );
    if !assignment.reason.is_empty() {
        println!("   Reason:       {}", wrap(&assignment.reason, 72).replace('\n', "\n                 "));
    }
    for alternative in &assignment.alternatives {
        println!("   Alternative:  {} {}", alternative.namespace, alternative.reason.dimmed());
    }
    for note in &assignment.notes {
        println!("   Note:         {}", note.yellow());
    }

    match &outcome.previous {
        None => println!("   {}", "not recorded before".dimmed()),
        Some(previous) if outcome.label_changed() => println!(
            "   {} {} -> {}",
            "Changed:".bright_yellow().bold(),
            previous.namespace,
            assignment.namespace
        ),
        Some(_) => println!("   {}", "unchanged".dimmed()),
    }
    println!();
}

/// Display the namespace census.
pub fn display_census(census: &NamespaceCensus, counts: bool) {
    for (namespace, files) in &census.namespaces {
        if counts {
            println!("{namespace}\t{files}");
        } else {
            println!("{namespace}");
        }
    }
}
