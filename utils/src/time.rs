//! Time formatting helpers.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render a duration in seconds as its two most significant units,
/// e.g. `16m 40s` or `365d 0h`.
pub fn format_duration(secs: u64) -> String {
    let Some(lead) = UNITS.iter().position(|(size, _)| secs >= *size) else {
        return "0s".to_string();
    };
    let (size, unit) = UNITS[lead];
    let mut out = format!("{}{unit}", secs / size);
    if let Some((next, next_unit)) = UNITS.get(lead + 1) {
        out.push_str(&format!(" {}{next_unit}", (secs % size) / next));
    }
    out
}
