use super::{print_details, spinner};
use colored::Colorize;
use forage::{FoodApi, FoodError};

pub async fn lookup(api: &FoodApi, barcode: &str, json: bool) -> anyhow::Result<()> {
    let pb = spinner(format!("Looking up {}...", barcode), json);
    let result = api.lookup(barcode).await;
    pb.finish_and_clear();

    match result {
        Ok(product) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                print_details(&product);
            }
            Ok(())
        }
        Err(err) => {
            // The error itself is reported by main; add a hint for the user
            if !json {
                if err.is_retryable() {
                    eprintln!("{} This may be temporary; try again shortly.", "!".yellow());
                } else if matches!(err, FoodError::ProductNotFound(_)) {
                    eprintln!(
                        "{} Try `forage search <name>` or enter the nutrition facts manually.",
                        "!".yellow()
                    );
                }
            }
            Err(err.into())
        }
    }
}
