//! Prompt construction for the external classifier
//!
//! The prompt carries the business context, the transaction details, the
//! allowed category list, and a few illustrative examples. The model is
//! instructed to answer with exactly one category code, `PERSONAL`, or
//! `MANUAL_REVIEW`; anything else is treated as an error by the parser.

use crate::catalog::CategoryDef;
use crate::models::{BusinessType, Transaction};

/// Build the classification prompt for one transaction.
pub fn build_prompt(
    transaction: &Transaction,
    cleaned_description: &str,
    business_type: Option<BusinessType>,
    allowed: &[&CategoryDef],
) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are classifying UK business bank transactions into HMRC tax categories.\n\n",
    );

    match business_type {
        Some(bt) => prompt.push_str(&format!("Business type: {}\n", bt)),
        None => prompt.push_str("Business type: not declared\n"),
    }
    prompt.push_str(&format!(
        "Transaction: \"{}\" ({} {:.2}",
        cleaned_description,
        transaction.transaction_type,
        transaction.amount
    ));
    if let Some(date) = transaction.date {
        prompt.push_str(&format!(", dated {}", date));
    }
    prompt.push_str(")\n\nAllowed categories:\n");

    for def in allowed {
        prompt.push_str(&format!("- {}: {} ({})\n", def.code, def.name, def.hmrc_ref));
    }

    prompt.push_str(
        "\nExamples:\n\
         - \"shell garage fuel\" -> travelCosts\n\
         - \"companies house filing fee\" -> professionalFees\n\
         - \"tesco weekly shop\" -> PERSONAL\n\
         - \"cheque 000421\" -> MANUAL_REVIEW\n\
         \nAnswer with exactly one category code from the list above, \
         or PERSONAL for private spend, or MANUAL_REVIEW if a human should decide. \
         Reply with the single token only.\n",
    );

    prompt
}
