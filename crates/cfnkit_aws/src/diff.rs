//! Line diff between a deployed template body and a freshly rendered one.
//!
//! Removed lines are tagged `[red]`, added lines `[green]`, matching the
//! markup the interactive surfaces colorize. Consumers that need plain text
//! strip the bracketed tags.

/// Render a line diff of `deployed` vs. `rendered`.
///
/// Returns an empty string when both bodies are identical.
pub fn render_diff(deployed: &str, rendered: &str) -> String {
    if deployed == rendered {
        return String::new();
    }

    let old: Vec<&str> = deployed.lines().collect();
    let new: Vec<&str> = rendered.lines().collect();
    let table = lcs_table(&old, &new);

    // Walk the table backwards, then reverse into display order
    let mut lines = Vec::new();
    let mut i = old.len();
    let mut j = new.len();

    while i > 0 && j > 0 {
        if old[i - 1] == new[j - 1] {
            lines.push(format!("  {}", old[i - 1]));
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            lines.push(format!("[red]- {}[/red]", old[i - 1]));
            i -= 1;
        } else {
            lines.push(format!("[green]+ {}[/green]", new[j - 1]));
            j -= 1;
        }
    }
    while i > 0 {
        lines.push(format!("[red]- {}[/red]", old[i - 1]));
        i -= 1;
    }
    while j > 0 {
        lines.push(format!("[green]+ {}[/green]", new[j - 1]));
        j -= 1;
    }

    lines.reverse();
    lines.join("\n")
}

/// Longest-common-subsequence length table for two line slices.
fn lcs_table(old: &[&str], new: &[&str]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in 1..=old.len() {
        for j in 1..=new.len() {
            table[i][j] = if old[i - 1] == new[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_bodies_yield_empty_diff() {
        let body = "Resources:\n  Vpc:\n    Type: AWS::EC2::VPC\n";
        assert_eq!(render_diff(body, body), "");
    }

    #[test]
    fn test_changed_line_is_tagged() {
        let deployed = "a\nb\nc";
        let rendered = "a\nB\nc";
        let diff = render_diff(deployed, rendered);

        assert!(diff.contains("  a"));
        assert!(diff.contains("[red]- b[/red]"));
        assert!(diff.contains("[green]+ B[/green]"));
        assert!(diff.contains("  c"));
    }

    #[test]
    fn test_addition_only() {
        let diff = render_diff("a", "a\nb");
        assert_eq!(diff, "  a\n[green]+ b[/green]");
    }

    #[test]
    fn test_removal_only() {
        let diff = render_diff("a\nb", "b");
        assert_eq!(diff, "[red]- a[/red]\n  b");
    }
}
