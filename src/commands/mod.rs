//! Command implementations for the forage CLI
//!
//! - **lookup**: resolve one barcode
//! - **search**: free-text search across both providers
//! - **completions**: shell completion scripts

pub mod completions;
pub mod lookup;
pub mod search;

pub use completions::completions;
pub use lookup::lookup;
pub use search::search;

use colored::Colorize;
use forage::Product;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while waiting on the network; hidden when not a TTY or emitting JSON
pub(crate) fn spinner(message: String, json: bool) -> ProgressBar {
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    if json || !is_tty {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Heading line: name, brand and source
pub(crate) fn print_heading(product: &Product) {
    let brand = product
        .brand
        .as_deref()
        .map(|b| format!(" ({})", b))
        .unwrap_or_default();
    println!(
        "{}{} {}",
        product.name.bold().green(),
        brand,
        format!("[{}]", product.barcode).dimmed()
    );
}

/// One-line macro summary for the stated serving
pub(crate) fn macro_line(product: &Product) -> String {
    format!(
        "{} kcal · P {:.1}g · C {:.1}g · F {:.1}g per {} {}",
        product.calories,
        product.protein,
        product.carbs,
        product.fat,
        format_amount(product.serving_size),
        product.serving_unit
    )
}

/// Full detail block used by `lookup`
pub(crate) fn print_details(product: &Product) {
    print_heading(product);
    println!("{}", macro_line(product));

    if let Some(description) = &product.serving_size_description {
        println!("{}: {}", "Serving".bold(), description);
    }
    println!(
        "{}: {:.1}g  {}: {:.1}g  {}: {:.0}mg",
        "Fiber".bold(),
        product.fiber,
        "Sugar".bold(),
        product.sugar,
        "Sodium".bold(),
        product.sodium
    );
    if let Some(grade) = &product.nutrition_grade {
        println!("{}: {}", "Nutri-Score".bold(), grade.to_uppercase());
    }
    if let Some(category) = &product.category {
        println!("{}: {}", "Category".bold(), category);
    }
    if let Some(quantity) = &product.quantity {
        println!("{}: {}", "Package".bold(), quantity);
    }
    if let Some(url) = &product.image_url {
        println!("{}: {}", "Image".bold(), url.dimmed());
    }
}

/// Drop a trailing `.0` from whole amounts
pub(crate) fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
