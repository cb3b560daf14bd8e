use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::session::LabelingSession;
use crate::error::MinerError;

/// What one line of operator input asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<J> {
    Judge(J),
    Back,
    Quit,
}

/// How the shell ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    /// `q` was entered or the input ran out.
    Quit,
}

/// A labeling mode: how input lines become judgments, and what happens after
/// each commit.
pub trait Mode {
    type Judgment;

    fn prompt(&self) -> String;

    /// `None` for unrecognized input.
    fn parse(&self, line: &str) -> Option<Command<Self::Judgment>>;

    fn describe(&self, judgment: &Self::Judgment) -> String;

    fn after_commit(&self, _session: &LabelingSession<Self::Judgment>) -> Result<()> {
        Ok(())
    }
}

/// Drive `session` from `input` until it finishes or the operator quits. The
/// session must be loaded first.
pub fn run<M, R, W>(
    session: &mut LabelingSession<M::Judgment>,
    mode: &M,
    mut input: R,
    mut out: W,
) -> Result<Outcome>
where
    M: Mode,
    R: BufRead,
    W: Write,
{
    while !session.is_done() {
        let Some(item) = session.current() else {
            return Err(MinerError::InvalidTransition {
                action: "review",
                state: session.state().to_string(),
            }
            .into());
        };
        let (position, total) = session.progress();
        writeln!(out)?;
        writeln!(out, "[{}/{}] row {}", position + 1, total, item.index)?;
        writeln!(out, "{}", item.text)?;
        if let Some(previous) = session.current_judgment() {
            writeln!(out, "current: {}", mode.describe(previous))?;
        }
        write!(out, "{}", mode.prompt())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Outcome::Quit);
        }

        match mode.parse(line.trim()) {
            Some(Command::Judge(judgment)) => {
                session.commit(judgment)?;
                mode.after_commit(session)?;
            }
            Some(Command::Back) => {
                if !session.previous() {
                    writeln!(out, "already at the first review")?;
                }
            }
            Some(Command::Quit) => return Ok(Outcome::Quit),
            None => writeln!(out, "unrecognized input: {:?}", line.trim())?,
        }
    }
    Ok(Outcome::Finished)
}

/// Categories selected for one review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLabels(pub BTreeSet<String>);

impl CategoryLabels {
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }
}

/// Multi-category labeling: a line lists category names or 1-based numbers
/// separated by spaces or commas; an empty line selects none.
pub struct CategoryPrompt {
    pub categories: Vec<String>,
}

impl CategoryPrompt {
    fn resolve(&self, token: &str) -> Option<&str> {
        if let Ok(n) = token.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| self.categories.get(i))
                .map(String::as_str);
        }
        self.categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(token))
            .map(String::as_str)
    }
}

impl Mode for CategoryPrompt {
    type Judgment = CategoryLabels;

    fn prompt(&self) -> String {
        let options: Vec<String> = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}={}", i + 1, c))
            .collect();
        format!("categories [{}] (b=back, q=quit)> ", options.join(" "))
    }

    fn parse(&self, line: &str) -> Option<Command<CategoryLabels>> {
        match line {
            "b" => return Some(Command::Back),
            "q" => return Some(Command::Quit),
            _ => {}
        }
        let mut selected = BTreeSet::new();
        for token in line.split([' ', ',']).filter(|t| !t.is_empty()) {
            selected.insert(self.resolve(token)?.to_string());
        }
        Some(Command::Judge(CategoryLabels(selected)))
    }

    fn describe(&self, judgment: &CategoryLabels) -> String {
        if judgment.0.is_empty() {
            "none".to_string()
        } else {
            judgment.0.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Valid/invalid review of a sample.
pub struct VerdictPrompt;

impl Mode for VerdictPrompt {
    type Judgment = Verdict;

    fn prompt(&self) -> String {
        "valid? [y/n] (b=back, q=quit)> ".to_string()
    }

    fn parse(&self, line: &str) -> Option<Command<Verdict>> {
        match line.to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(Command::Judge(Verdict::Valid)),
            "n" | "no" => Some(Command::Judge(Verdict::Invalid)),
            "b" => Some(Command::Back),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }

    fn describe(&self, judgment: &Verdict) -> String {
        match judgment {
            Verdict::Valid => "valid".to_string(),
            Verdict::Invalid => "not valid".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::session::Item;
    use std::io::Cursor;

    fn prompt() -> CategoryPrompt {
        CategoryPrompt {
            categories: vec!["handicap".into(), "pet".into(), "child".into()],
        }
    }

    fn labels(names: &[&str]) -> CategoryLabels {
        CategoryLabels(names.iter().map(|n| n.to_string()).collect())
    }

    fn session(n: usize) -> LabelingSession<CategoryLabels> {
        let mut s = LabelingSession::new("in.csv", "out.csv");
        s.load((0..n).map(|i| Item::new(i, format!("review {}", i))).collect())
            .unwrap();
        s
    }

    #[test]
    fn test_parse_categories_by_name_and_number() {
        let p = prompt();
        assert_eq!(p.parse("pet, 3"), Some(Command::Judge(labels(&["pet", "child"]))));
        assert_eq!(p.parse("HANDICAP"), Some(Command::Judge(labels(&["handicap"]))));
        assert_eq!(p.parse(""), Some(Command::Judge(labels(&[]))));
        assert_eq!(p.parse("b"), Some(Command::Back));
        assert_eq!(p.parse("q"), Some(Command::Quit));
        assert_eq!(p.parse("4"), None);
        assert_eq!(p.parse("0"), None);
        assert_eq!(p.parse("cat"), None);
    }

    #[test]
    fn test_parse_verdicts() {
        assert_eq!(VerdictPrompt.parse("Y"), Some(Command::Judge(Verdict::Valid)));
        assert_eq!(VerdictPrompt.parse("n"), Some(Command::Judge(Verdict::Invalid)));
        assert_eq!(VerdictPrompt.parse("maybe"), None);
    }

    #[test]
    fn test_run_to_completion_with_back_and_bad_input() {
        let mut s = session(2);
        let input = Cursor::new("b\npet\nzebra\nb\n1\n2 3\n");
        let mut out = Vec::new();
        let outcome = run(&mut s, &prompt(), input, &mut out).unwrap();

        assert_eq!(outcome, Outcome::Finished);
        let judged: Vec<&CategoryLabels> = s.judged().map(|(_, j)| j).collect();
        assert_eq!(judged, vec![&labels(&["handicap"]), &labels(&["pet", "child"])]);

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("already at the first review"));
        assert!(transcript.contains("unrecognized input: \"zebra\""));
        assert!(transcript.contains("current: pet"));
    }

    #[test]
    fn test_unloaded_session_is_rejected() {
        let mut s: LabelingSession<CategoryLabels> = LabelingSession::new("in.csv", "out.csv");
        let err = run(&mut s, &prompt(), Cursor::new("pet\n"), Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MinerError>(),
            Some(MinerError::InvalidTransition { action: "review", .. })
        ));
    }

    #[test]
    fn test_finished_session_returns_without_reading() {
        let mut s = session(0);
        let mut out = Vec::new();
        let outcome = run(&mut s, &prompt(), Cursor::new("pet\n"), &mut out).unwrap();
        assert_eq!(outcome, Outcome::Finished);
        assert!(out.is_empty());
    }

    #[test]
    fn test_quit_and_eof_stop_early() {
        let mut s = session(3);
        let outcome = run(&mut s, &prompt(), Cursor::new("pet\nq\n"), Vec::new()).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(s.progress(), (1, 3));

        let outcome = run(&mut s, &prompt(), Cursor::new(""), Vec::new()).unwrap();
        assert_eq!(outcome, Outcome::Quit);
        assert_eq!(s.progress(), (1, 3));
    }
}
