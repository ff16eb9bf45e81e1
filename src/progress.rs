pub const BAR_WIDTH: usize = 50;

/// Renders `[=====     ]` with `completed / total` of the bar filled, rounded to the nearest cell.
pub fn bar(total: u64, completed: u64) -> String {
    let filled = if total == 0 {
        BAR_WIDTH
    } else {
        let ratio = completed.min(total) as f64 / total as f64;
        (ratio * BAR_WIDTH as f64).round() as usize
    };
    format!("[{}{}]", "=".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}
