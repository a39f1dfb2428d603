use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::{
    dfa::Dfa,
    error::Result,
    nfa::Nfa,
    regex::{to_postfix, Postfix},
    simulate::Acceptor,
};

/// Every intermediate result of compiling one pattern.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The pattern as it was given.
    pub pattern: String,
    /// The postfix form of the pattern.
    pub postfix: Postfix,
    /// The result of Thompson's construction.
    pub nfa: Nfa,
    /// The determinized NFA.
    pub dfa: Dfa,
    /// The minimized DFA.
    pub minimal: Dfa,
}

impl Compiled {
    /// Runs `input` through all three automata.
    pub fn verdicts(&self, input: &str) -> Verdicts {
        Verdicts {
            nfa: self.nfa.accepts(input),
            dfa: self.dfa.accepts(input),
            minimized: self.minimal.accepts(input),
        }
    }
}

/// Compiles `pattern` all the way to a minimal DFA.
///
/// ```
/// use thompson::prelude::*;
///
/// let compiled = compile("a?b").unwrap();
/// assert_eq!(compiled.postfix.to_string(), "a?b.");
/// assert!(compiled.verdicts("ab").all());
/// assert!(compile("(a").is_err());
/// ```
pub fn compile(pattern: &str) -> Result<Compiled> {
    let postfix = to_postfix(pattern)?;
    debug!("postfix of {pattern} is {postfix}");
    let nfa = Nfa::from_postfix(&postfix)?;
    debug!("NFA has {} states", nfa.size());
    let dfa = nfa.determinize();
    let minimal = dfa.minimize();

    Ok(Compiled {
        pattern: pattern.to_string(),
        postfix,
        nfa,
        dfa,
        minimal,
    })
}

/// Acceptance of one input by each stage of a [`Compiled`] pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdicts {
    /// Acceptance by the NFA.
    pub nfa: bool,
    /// Acceptance by the DFA.
    pub dfa: bool,
    /// Acceptance by the minimized DFA.
    pub minimized: bool,
}

impl Verdicts {
    /// True if all three automata accept.
    pub fn all(&self) -> bool {
        self.nfa && self.dfa && self.minimized
    }

    /// True if the three automata agree, which they always should.
    pub fn consistent(&self) -> bool {
        self.nfa == self.dfa && self.dfa == self.minimized
    }
}

/// The outcome for a single pattern of a batch.
#[derive(Debug, Clone)]
pub struct PatternReport {
    /// Position of the pattern in the batch, counting from 1.
    pub index: usize,
    /// The pattern itself.
    pub pattern: String,
    /// The compiled automata or the reason why compilation failed.
    pub outcome: Result<Compiled>,
    /// Acceptance of the test input, if one was given and compilation succeeded.
    pub verdicts: Option<Verdicts>,
}

impl PatternReport {
    /// Returns true if the pattern compiled.
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Compiles every pattern independently. A pattern that fails to compile is logged and
/// reported, the remaining patterns are processed regardless. If `input` is given, it is
/// simulated on each successfully compiled pattern.
pub fn run_batch<I, P>(patterns: I, input: Option<&str>) -> Vec<PatternReport>
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    patterns
        .into_iter()
        .enumerate()
        .map(|(i, pattern)| {
            let pattern = pattern.as_ref();
            let index = i + 1;
            info!("processing pattern {index}: {pattern}");

            let outcome = compile(pattern);
            let verdicts = match (&outcome, input) {
                (Ok(compiled), Some(input)) => Some(compiled.verdicts(input)),
                (Err(e), _) => {
                    warn!("skipping pattern {index} \"{pattern}\": {e}");
                    None
                }
                _ => None,
            };

            PatternReport {
                index,
                pattern: pattern.to_string(),
                outcome,
                verdicts,
            }
        })
        .collect()
}

/// Reads one pattern per line. Surrounding whitespace is trimmed and blank lines are
/// skipped.
pub fn read_patterns<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut patterns = vec![];
    for line in reader.lines() {
        let line = line?;
        let pattern = line.trim();
        if !pattern.is_empty() {
            patterns.push(pattern.to_string());
        }
    }
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test_log::test]
    fn batch_continues_after_failure() {
        let reports = run_batch([")(", "a|b", "a|", "ab*"], Some("ab"));
        assert_eq!(reports.len(), 4);
        assert_eq!(
            reports.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        assert_eq!(
            reports[0].outcome.as_ref().unwrap_err(),
            &Error::MalformedExpression
        );
        assert_eq!(reports[0].verdicts, None);

        assert!(reports[1].is_ok());
        assert_eq!(
            reports[1].verdicts,
            Some(Verdicts {
                nfa: false,
                dfa: false,
                minimized: false
            })
        );

        assert_eq!(
            reports[2].outcome.as_ref().unwrap_err(),
            &Error::InsufficientOperands { operator: '|' }
        );
        assert!(reports[3].verdicts.unwrap().all());
    }

    #[test_log::test]
    fn batch_without_input() {
        let reports = run_batch(vec!["(a|b)*abb".to_string()], None);
        assert_eq!(reports[0].verdicts, None);
        let compiled = reports[0].outcome.as_ref().unwrap();
        assert_eq!(compiled.dfa.size(), 5);
        assert_eq!(compiled.minimal.size(), 4);
        assert!(compiled.verdicts("babb").consistent());
    }

    #[test]
    fn reading_patterns_skips_blank_lines() {
        let source = "a|b\n\n  ab*  \r\n\t\n(a|b)+\n";
        let patterns = read_patterns(std::io::Cursor::new(source)).unwrap();
        assert_eq!(patterns, vec!["a|b", "ab*", "(a|b)+"]);
    }
}
