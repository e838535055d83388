//! Terminal rendering for evaluation reports, model versions, and the catalog.

use arrow::util::pretty::pretty_format_batches;
use wikilang_ai::ConfusionMatrix;
use wikilang_core::LanguageCatalog;
use wikilang_store::Manifest;

/// Confusion matrix as a table, followed by per-language recall.
pub fn print_confusion(matrix: &ConfusionMatrix) -> anyhow::Result<()> {
    let batch = matrix.to_record_batch()?;
    println!("{}", pretty_format_batches(&[batch])?);
    println!();

    for (i, code) in matrix.labels().iter().enumerate() {
        match matrix.class_accuracy(i) {
            Some(acc) => println!(
                "  {:<26} {:>6.1}%  ({} windows)",
                code,
                acc * 100.0,
                matrix.row_total(i)
            ),
            None => println!("  {:<26} {:>7}", code, "-"),
        }
    }
    println!();

    match matrix.accuracy() {
        Some(acc) => println!("  {:<26} {:>6.1}%", "overall", acc * 100.0),
        None => println!("  {:<26} {:>7}", "overall", "-"),
    }
    println!(
        "  {:<26} {}",
        "diagonal dominant",
        if matrix.is_diagonal_dominant() { "yes" } else { "no" }
    );
    println!(
        "  {:<26} {}",
        "beats chance",
        if matrix.beats_chance() { "yes" } else { "no" }
    );
    Ok(())
}

/// One line per version: number, creation time, and publication state.
pub fn print_versions(name: &str, versions: &[(u32, Option<Manifest>)]) {
    println!("=== {name} ===");
    if versions.is_empty() {
        println!("  (no versions)");
        return;
    }
    for (version, manifest) in versions {
        match manifest {
            Some(m) => println!(
                "  v{:<6} {}  {} components",
                version,
                m.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                m.components.len()
            ),
            None => println!("  v{:<6} (incomplete)", version),
        }
    }
}

pub fn print_catalog(catalog: &LanguageCatalog) {
    println!(
        "  {:<4} {:<6} {:<26} {:>12} {:>10}",
        "#", "code", "name", "articles", "users"
    );
    for (i, language) in catalog.iter().enumerate() {
        let articles = language.articles.map_or("-".to_string(), |n| n.to_string());
        let users = language.users.map_or("-".to_string(), |n| n.to_string());
        println!(
            "  {:<4} {:<6} {:<26} {:>12} {:>10}",
            i, language.code, language.name, articles, users
        );
    }
}
