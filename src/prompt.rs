//! Interactive prompts: page-count menu and player/team name selection.
//!
//! Both prompts keep asking until they get a valid answer or the user ends
//! input (Ctrl-C / Ctrl-D), which surfaces as [`SelectionError::Aborted`].
//! A terminal that cannot be read surfaces as [`SelectionError::Terminal`].
//! The loops are written over plain line iterators so they can be driven
//! by tests; the `prompt_*` functions feed them from a `rustyline` editor.

use crate::error::SelectionError;
use clap::ValueEnum;
use itertools::Itertools;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::collections::HashSet;
use tracing::{debug, warn};

const PAGES_PROMPT: &str = "Please select the number of data pages you want to obtain: ";
const NAME_PROMPT: &str = "Which player or team are you looking for from the list above? ";

/// Menu entries for how many "Load more" rounds to run.
///
/// The `30` entry runs only 25 rounds. That is how the menu has always
/// behaved; whether 30 was intended is unknown, so it is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageCount {
    #[value(name = "5")]
    Five,
    #[value(name = "10")]
    Ten,
    #[value(name = "20")]
    Twenty,
    #[value(name = "30")]
    Thirty,
}

impl PageCount {
    pub const ALL: [PageCount; 4] = [Self::Five, Self::Ten, Self::Twenty, Self::Thirty];

    pub fn label(self) -> &'static str {
        match self {
            Self::Five => "5",
            Self::Ten => "10",
            Self::Twenty => "20",
            Self::Thirty => "30",
        }
    }

    /// Number of load rounds this entry maps to.
    pub fn attempts(self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Thirty => 25,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label.trim())
    }
}

/// Exact, case-sensitive membership check of `input` against `known`.
pub fn resolve<'a>(input: &str, known: &'a HashSet<String>) -> Result<&'a str, SelectionError> {
    known
        .get(input)
        .map(String::as_str)
        .ok_or_else(|| SelectionError::InvalidName(input.to_string()))
}

/// Names sorted for display, comma-separated.
pub fn format_names(known: &HashSet<String>) -> String {
    known.iter().sorted().join(", ")
}

/// Take lines until one is a menu label. A read error ends the loop with that error.
pub fn choose_pages<I>(lines: I) -> Result<PageCount, SelectionError>
where
    I: IntoIterator<Item = Result<String, SelectionError>>,
{
    for line in lines {
        let line = line?;
        match PageCount::from_label(&line) {
            Some(pages) => {
                debug!(label = pages.label(), attempts = pages.attempts(), "Page count chosen");
                return Ok(pages);
            }
            None => println!(
                "`{}` is not on the menu. Choose one of: {}",
                line,
                PageCount::ALL.iter().map(|p| p.label()).join(", ")
            ),
        }
    }
    Err(SelectionError::Aborted)
}

/// Take lines until one exactly matches a known name. A read error ends the loop with that error.
pub fn choose_name<I>(lines: I, known: &HashSet<String>) -> Result<String, SelectionError>
where
    I: IntoIterator<Item = Result<String, SelectionError>>,
{
    for line in lines {
        let line = line?;
        match resolve(&line, known) {
            Ok(name) => return Ok(name.to_string()),
            Err(e) => println!("{e}. Try another name!"),
        }
    }
    Err(SelectionError::Aborted)
}

/// Show the page menu and read a choice from the terminal.
pub fn prompt_pages() -> Result<PageCount, SelectionError> {
    let mut rl = Editor::<(), DefaultHistory>::new()
        .map_err(|e| SelectionError::Terminal(e.to_string()))?;
    for pages in PageCount::ALL {
        println!("  {}", pages.label());
    }
    choose_pages(read_lines(&mut rl, PAGES_PROMPT))
}

/// Read a name from the terminal, with Tab completion over `known`.
pub fn prompt_name(known: &HashSet<String>) -> Result<String, SelectionError> {
    let mut rl = Editor::<NameHelper, DefaultHistory>::new()
        .map_err(|e| SelectionError::Terminal(e.to_string()))?;
    rl.set_helper(Some(NameHelper::new(known)));
    choose_name(read_lines(&mut rl, NAME_PROMPT), known)
}

/// Lines from `rl` until interrupt or EOF. Any other read failure is
/// yielded as [`SelectionError::Terminal`].
fn read_lines<'a, H: Helper>(
    rl: &'a mut Editor<H, DefaultHistory>,
    prompt: &'a str,
) -> impl Iterator<Item = Result<String, SelectionError>> + 'a {
    std::iter::from_fn(move || match rl.readline(prompt) {
        Ok(line) => {
            let _ = rl.add_history_entry(line.as_str());
            Some(Ok(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
        Err(e) => {
            warn!(error = %e, "Reading from terminal failed");
            Some(Err(SelectionError::Terminal(e.to_string())))
        }
    })
}

/// Tab completion and inline hints over the scraped names.
pub struct NameHelper {
    names: Vec<String>,
}

impl NameHelper {
    pub fn new(known: &HashSet<String>) -> Self {
        Self {
            names: known.iter().sorted().cloned().collect(),
        }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.names.iter().filter(move |n| n.starts_with(prefix))
    }
}

impl Completer for NameHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let matches = self
            .matching(&line[..pos])
            .map(|n| Pair {
                display: n.clone(),
                replacement: n.clone(),
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for NameHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        self.matching(line)
            .find(|n| n.as_str() != line)
            .map(|n| n[line.len()..].to_string())
    }
}

impl Highlighter for NameHelper {}
impl Validator for NameHelper {}
impl Helper for NameHelper {}
