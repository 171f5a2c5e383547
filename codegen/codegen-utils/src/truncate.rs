//! Cutting generated code at heuristic stop markers.
//!
//! Sampled completions run on past the function the prompt asked for. The
//! cut keeps at most one top-level `print`, at most one top-level `def`, and
//! everything before the first terminal marker.

use std::sync::LazyLock;

use regex::Regex;

/// Terminal markers checked by default.
///
/// A line starting with `#`, the end-of-text token, a line starting a
/// docstring, and two blank lines in a row.
pub const DEFAULT_TERMINALS: &[&str] = &[
    r"(?m)^#",
    r"<\|endoftext\|>",
    r"(?m)^'''",
    r#"(?m)^""""#,
    r"\n\n\n",
];

static DEFAULT_TRUNCATOR: LazyLock<Result<Truncator, regex::Error>> =
    LazyLock::new(Truncator::compile);

/// Compiled stop markers.
///
/// # Example
///
/// ```
/// use codegen_utils::Truncator;
///
/// let truncator = Truncator::new().unwrap();
/// let completion = "def walk():\n    return 1\n\n\n\nprint('junk')";
/// assert_eq!(truncator.truncate(completion), "def walk():\n    return 1");
/// ```
#[derive(Debug, Clone)]
pub struct Truncator {
    print: Regex,
    def: Regex,
    terminals: Vec<Regex>,
}

impl Truncator {
    /// Compile the default markers.
    pub fn new() -> crate::Result<Self> {
        Ok(Self::compile()?)
    }

    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            print: Regex::new(r"(?m)^print")?,
            def: Regex::new(r"(?m)^def")?,
            terminals: DEFAULT_TERMINALS
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Add a terminal marker.
    pub fn with_terminal(mut self, pattern: &str) -> crate::Result<Self> {
        self.terminals.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Number of terminal markers.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Cut `completion` at the stop markers.
    #[must_use]
    pub fn truncate<'a>(&self, completion: &'a str) -> &'a str {
        let mut text = completion;
        if let Some(cut) = second_match(&self.print, text) {
            text = &text[..cut];
        }
        if let Some(cut) = second_match(&self.def, text) {
            text = &text[..cut];
        }

        self.terminals
            .iter()
            .filter_map(|terminal| terminal.find(text).map(|m| m.start()))
            .min()
            .map_or(text, |cut| &text[..cut])
    }
}

fn second_match(pattern: &Regex, text: &str) -> Option<usize> {
    pattern.find_iter(text).nth(1).map(|m| m.start())
}

/// Cut `completion` at the default stop markers.
///
/// # Errors
///
/// Fails only if the built-in markers do not compile.
pub fn truncate(completion: &str) -> crate::Result<&str> {
    let truncator = DEFAULT_TRUNCATOR.as_ref().map_err(|e| e.clone())?;
    Ok(truncator.truncate(completion))
}
