//! Solver progress from stdout

use indicatif::{ProgressBar, ProgressStyle};

/// Marker the solver prints before the current step number
const STEP_MARKER: &str = "Time step:";

/// Outcome of inspecting one stdout line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepLine {
    /// Line carries no progress information
    Other,
    Step(u64),
    /// Marker present but the number could not be parsed
    Malformed(String),
}

/// Classify a stdout line, e.g. `Time step: 120`
pub fn parse_step_line(line: &str) -> StepLine {
    let Some(pos) = line.find(STEP_MARKER) else {
        return StepLine::Other;
    };
    let rest = line[pos + STEP_MARKER.len()..].trim();
    let token = rest.split_whitespace().next().unwrap_or("");
    match token.parse::<u64>() {
        Ok(step) => StepLine::Step(step),
        Err(e) => StepLine::Malformed(format!("'{}' ({e})", line.trim())),
    }
}

/// Progress bar sized to the expected number of steps
pub fn step_bar(total_steps: u64, visible: bool, label: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total_steps);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} steps ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_line() {
        assert_eq!(parse_step_line("Time step: 42"), StepLine::Step(42));
        assert_eq!(parse_step_line("  Time step:   7   dt=30s"), StepLine::Step(7));
        assert_eq!(parse_step_line("Initialising domain"), StepLine::Other);
        assert!(matches!(parse_step_line("Time step: n/a"), StepLine::Malformed(_)));
    }

    #[test]
    fn test_hidden_bar() {
        let bar = step_bar(10, false, "trial 0");
        assert!(bar.is_hidden());
    }
}
