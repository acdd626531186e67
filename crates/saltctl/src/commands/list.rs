//! `saltctl list`

use super::to_json;
use anyhow::Result;
use salt_calls::modules::test::FUNCTIONS;

pub fn run(json: bool, pretty: bool) -> Result<String> {
    if json {
        return Ok(to_json(&FUNCTIONS, pretty)?);
    }

    let width = FUNCTIONS.iter().map(|f| f.name.len()).max().unwrap_or(0);
    let lines: Vec<String> = FUNCTIONS
        .iter()
        .map(|f| {
            let args = if f.arguments.is_empty() {
                "-".to_string()
            } else {
                f.arguments.join(", ")
            };
            format!("{:width$}  {:<20}  {}", f.name, f.returns, args, width = width)
        })
        .collect();
    Ok(lines.join("\n"))
}
