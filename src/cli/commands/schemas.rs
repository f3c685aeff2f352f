//! Schema listing command.

use console::style;

use crate::extract::Schema;

pub fn cmd_schemas() -> anyhow::Result<()> {
    println!("\n{}", style("Built-in Extraction Schemas").bold());
    println!("{}", "-".repeat(50));

    for schema in Schema::builtin() {
        println!(
            "\n{}  {}",
            style(schema.name()).cyan().bold(),
            style(schema.description()).dim()
        );
        for field in schema.fields() {
            let marker = if schema.required().contains(&field.name) {
                style("*").red().to_string()
            } else {
                " ".to_string()
            };
            println!("  {} {:<20} {}", marker, field.name, style(field.hint).dim());
        }
    }

    println!("\n{} required field", style("*").red());
    Ok(())
}
