//! Categories command implementation

use anyhow::Result;
use sortcode_core::{BusinessType, Categorizer};

/// List the categories available to a business type.
pub fn cmd_categories(business_type: Option<&str>) -> Result<()> {
    let business_type = match business_type {
        Some(tag) => Some(tag.parse::<BusinessType>().map_err(anyhow::Error::msg)?),
        None => None,
    };

    let engine = Categorizer::in_memory();
    let view = engine.available_categories(business_type);

    match business_type {
        Some(bt) => println!("Categories for a {} business:\n", bt),
        None => println!("All categories:\n"),
    }

    println!("Expenses:");
    for def in &view.expenses {
        println!("  {:<28} {} ({})", def.code, def.name, def.hmrc_ref);
    }
    println!("\nIncome:");
    for def in &view.income {
        println!("  {:<28} {} ({})", def.code, def.name, def.hmrc_ref);
    }

    Ok(())
}
