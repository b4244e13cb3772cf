//! Utility functions and helpers

/// Format a raw integer amount with the given number of decimals.
pub fn format_amount(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let frac = amount % scale;
    format!("{}.{:0width$}", whole, frac, width = decimals as usize)
}

/// Generate a unique run identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
