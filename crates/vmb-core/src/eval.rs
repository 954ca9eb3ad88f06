//! Owner `eval` result composition.
//!
//! Running the code is the adapter's business; this module only turns the
//! outcome into an embed plus attachments.

use crate::{
    compose::{OutgoingMessage, Report, RoutePolicy},
    embed::Embed,
    errors::ComposeError,
};

/// Everything an evaluation produced, already rendered to strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalOutcome {
    /// Rendered return value (`None` when nothing was returned).
    pub returned: Option<String>,
    /// Captured standard output.
    pub stdout: String,
    /// Traceback when evaluation failed.
    pub traceback: Option<String>,
}

/// Strip a surrounding code fence, or stray backticks/spaces/newlines.
pub fn cleanup_code(code: &str) -> String {
    if code.starts_with("```") && code.ends_with("```") && code.len() >= 6 {
        let lines: Vec<&str> = code.split('\n').collect();
        if lines.len() < 2 {
            return String::new();
        }
        return lines[1..lines.len() - 1].join("\n");
    }
    code.trim_matches(|c| c == '`' || c == ' ' || c == '\n')
        .to_string()
}

/// Compose the reply for an evaluation.
pub fn render_eval(base: Embed, outcome: &EvalOutcome) -> Result<OutgoingMessage, ComposeError> {
    let mut report = Report::new(base, RoutePolicy::eval());

    if let Some(tb) = &outcome.traceback {
        report.section("traceback", tb, Some("py"), "traceback.py")?;
    } else if let Some(returned) = &outcome.returned {
        report.section("return", returned, Some("py"), "returned.py")?;
    }
    if !outcome.stdout.is_empty() {
        report.section("stdout", &outcome.stdout, Some("py"), "stdout.py")?;
    }

    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_strips_fences() {
        assert_eq!(cleanup_code("```py\nprint(1)\nprint(2)\n```"), "print(1)\nprint(2)");
        assert_eq!(cleanup_code("`x + 1` \n"), "x + 1");
        assert_eq!(cleanup_code("plain"), "plain");
    }

    #[test]
    fn returned_value_becomes_a_field() {
        let out = render_eval(
            Embed::new(),
            &EvalOutcome {
                returned: Some("[1, 2, 3]".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let embed = out.embed.unwrap();
        assert_eq!(embed.fields().len(), 1);
        assert_eq!(embed.fields()[0].name(), "return");
        assert_eq!(embed.fields()[0].value(), "```py\n[1, 2, 3]\n```");
        assert!(out.files.is_empty());
    }

    #[test]
    fn traceback_wins_over_return_value() {
        let out = render_eval(
            Embed::new(),
            &EvalOutcome {
                returned: Some("ignored".into()),
                traceback: Some("ZeroDivisionError".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let embed = out.embed.unwrap();
        assert_eq!(embed.fields().len(), 1);
        assert_eq!(embed.fields()[0].name(), "traceback");
    }

    #[test]
    fn long_stdout_attaches_the_captured_text() {
        let stdout = "out\n".repeat(600);
        let out = render_eval(
            Embed::new(),
            &EvalOutcome {
                stdout: stdout.clone(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.files[0].filename, "stdout.py");
        assert_eq!(out.files[0].content, stdout.into_bytes());
        assert_eq!(out.embed.unwrap().description(), Some("see files"));
    }

    #[test]
    fn nothing_to_show_gets_placeholder() {
        let out = render_eval(Embed::new(), &EvalOutcome::default()).unwrap();
        let embed = out.embed.unwrap();
        assert_eq!(embed.fields()[0].value(), "No data");
    }
}
