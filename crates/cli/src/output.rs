//! Terminal output.

use colored::Colorize;
use lvgen_codegen::{GenerateFailure, RenderedModule};
use lvgen_core::{ArtifactKind, TableInfo};
use lvgen_ir::{ColumnInfo, GenerateResult};

pub fn print_tables(tables: &[TableInfo], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tables)?);
        return Ok(());
    }
    let width = tables.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for table in tables {
        let name = format!("{:width$}", table.name, width = width);
        println!("{}  {}", name.bold(), table.comment.as_str().dimmed());
    }
    Ok(())
}

pub fn print_columns(columns: &[ColumnInfo], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(columns)?);
        return Ok(());
    }
    let flag = |on: bool, c: &'static str| if on { c.green() } else { "-".dimmed() };
    println!(
        "{}",
        format!("{:<20} {:<12} {:<10} {:<10} {:<6} {}", "column", "type", "widget", "filter", "q/l/f", "label").bold()
    );
    for c in columns {
        println!(
            "{:<20} {:<12} {:<10} {:<10} {}{}{}    {}",
            c.column_name,
            c.target_type.go_type(),
            c.form_widget.as_str(),
            c.query_operator.as_str(),
            flag(c.is_query, "q"),
            flag(c.is_list, "l"),
            flag(c.is_form, "f"),
            c.label().dimmed(),
        );
    }
    Ok(())
}

pub fn print_preview(
    rendered: &RenderedModule,
    artifact: Option<ArtifactKind>,
    json: bool,
) -> anyhow::Result<()> {
    if let Some(kind) = artifact {
        let text = rendered
            .get(kind)
            .ok_or_else(|| anyhow::anyhow!("artifact '{}' was not rendered", kind))?;
        if json {
            let single = std::collections::BTreeMap::from([(kind.key(), text)]);
            println!("{}", serde_json::to_string_pretty(&single)?);
        } else {
            print!("{}", text);
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.to_preview_map())?);
        return Ok(());
    }
    for (kind, text) in rendered.iter() {
        println!("{}", format!("── {} ──", kind).cyan().bold());
        print!("{}", text);
        println!();
    }
    Ok(())
}

pub fn print_result(result: &GenerateResult) {
    println!("{} {}", "✓".green().bold(), result.message);
    for path in &result.written_paths {
        println!("  {} {}", "wrote".green(), path.display());
    }
    if !result.router_updated {
        println!("  {} router already registers this module", "skip".yellow());
    }
    if let Some(id) = result.menu_id {
        println!("  {} menu #{}", "menu".green(), id);
    }
}

pub fn print_failure(failure: &GenerateFailure) {
    eprintln!(
        "{} {} failed [{}]: {}",
        "✗".red().bold(),
        failure.stage,
        failure.kind().as_str(),
        failure.error,
    );
    if failure.partial.written_paths.is_empty() {
        return;
    }

    let (label, note) = if failure.rolled_back {
        ("undone".yellow(), "all side effects were rolled back")
    } else {
        ("left".red(), "partial output left in place")
    };
    eprintln!("  {}", note);
    for path in &failure.partial.written_paths {
        eprintln!("  {} {}", label, path.display());
    }
    for message in &failure.compensation_failures {
        eprintln!("  {} {}", "not undone".red(), message);
    }
}
