use crate::domain::models::JsonOut;
use serde::Serialize;

/// Print a list either as the `JsonOut` envelope or line-by-line through
/// `row`.
pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

/// Print a single value either as the `JsonOut` envelope or via `text`.
pub fn print_one<T: Serialize>(
    json: bool,
    data: &T,
    text: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", text(data));
    }
    Ok(())
}
