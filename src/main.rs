use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use photo_collection::{
    collection_summary, config, ranked, Catalog, Collection, Library, SeriesSelection, ALL_SERIES,
};

/// Print collection progress for a series (or all series)
#[derive(Parser, Debug)]
#[command(name = "photo-collection", version, about)]
struct Args {
    /// Snapshot file (defaults to config.toml `data_file`, then the user data directory)
    #[arg(long, env = "PHOTO_COLLECTION_DATA")]
    data_file: Option<PathBuf>,

    /// Series to report on, or "all"
    #[arg(long, default_value = ALL_SERIES)]
    series: String,

    /// List the series defined per group and exit
    #[arg(long)]
    list_series: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let data_file = config::resolve_data_file(args.data_file.as_deref());
    let mut collection = Collection::open(Catalog::builtin(), Library::open(data_file));

    for warning in collection.take_warnings() {
        eprintln!("warning: {}", warning);
    }

    if args.list_series {
        for category in photo_collection::Category::ALL {
            let names = collection.registry().series_names(category);
            println!("{}: {}", category, if names.is_empty() { "-".to_string() } else { names.join(", ") });
        }
        return Ok(());
    }

    let selection = SeriesSelection::parse(&args.series);
    if let SeriesSelection::Series(name) = &selection {
        if !collection.registry().all_series_names().contains(name) {
            anyhow::bail!("unknown series '{}'", name);
        }
    }

    let progress = collection.progress(&selection);
    println!("Progress: {}", args.series.trim());
    println!("{:<10} {:<14} {:>6} {:>6} {:>8} {:>7}", "group", "member", "need", "owned", "complete", "surplus");
    for (name, p) in ranked(&progress) {
        println!(
            "{:<10} {:<14} {:>6} {:>6} {:>7.1}% {:>7}",
            p.category.name(),
            name,
            p.total_needed,
            p.total_owned,
            p.completion_percent(),
            p.surplus()
        );
    }

    let summary = collection_summary(&progress);
    println!(
        "{} members, {} complete, {}/{} photos ({:.1}%), {} spare",
        summary.subjects,
        summary.complete_subjects,
        summary.total_collected,
        summary.total_needed,
        summary.completion_percent(),
        summary.total_surplus
    );

    Ok(())
}
