use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a two-column agent availability table.
pub fn print_availability(rows: &[(&str, bool)]) {
    print!("{}", render_availability(rows));
}

/// Names left-aligned, `yes`/`no` right-aligned under `AVAILABLE`.
fn render_availability(rows: &[(&str, bool)]) -> String {
    const NAME: &str = "AGENT";
    const STATE: &str = "AVAILABLE";

    let name_width = rows
        .iter()
        .map(|(name, _)| name.len())
        .chain(std::iter::once(NAME.len()))
        .max()
        .unwrap_or(NAME.len());
    let state_width = STATE.len();

    let mut out = format!("{NAME:<name_width$}  {STATE:>state_width$}\n");
    out.push_str(&format!(
        "{}  {}\n",
        "-".repeat(name_width),
        "-".repeat(state_width)
    ));
    for (name, available) in rows {
        let state = if *available { "yes" } else { "no" };
        out.push_str(&format!("{name:<name_width$}  {state:>state_width$}\n"));
    }
    out
}
