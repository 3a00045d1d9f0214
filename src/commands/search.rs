use super::{macro_line, print_heading, spinner};
use colored::Colorize;
use forage::FoodApi;

pub async fn search(
    api: &FoodApi,
    query: &str,
    page: u32,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let pb = spinner(format!("Searching for '{}'...", query), json);
    let mut results = api.search(query, page).await;
    pb.finish_and_clear();

    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No foods found matching '{}'", "✗".red(), query);
        return Ok(());
    }

    for product in &results {
        print_heading(product);
        println!("  {}", macro_line(product).dimmed());
    }

    Ok(())
}
