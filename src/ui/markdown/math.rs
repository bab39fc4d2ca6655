//! Expansion of the small LaTeX subset allowed inside `\[ ... \]`.

use memchr::{memchr, memmem};

/// Control words replaced by a single symbol. Matching is whole-word, so
/// `\leq` and `\le` both resolve and `\left` is left alone.
const SYMBOLS: &[(&str, &str)] = &[
    ("times", "×"),
    ("div", "÷"),
    ("cdot", "·"),
    ("pm", "±"),
    ("mp", "∓"),
    ("le", "≤"),
    ("leq", "≤"),
    ("ge", "≥"),
    ("geq", "≥"),
    ("ne", "≠"),
    ("neq", "≠"),
    ("approx", "≈"),
    ("sum", "Σ"),
    ("prod", "Π"),
    ("int", "∫"),
    ("infty", "∞"),
    ("sqrt", "√"),
    ("bullet", "•"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("sigma", "σ"),
    ("phi", "φ"),
    ("omega", "ω"),
];

fn symbol_for(word: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, symbol)| *symbol)
}

/// Expands `\text{x}`, `\boxed{x}`, thin spaces and symbol control words.
pub fn expand_math(formula: &str) -> String {
    let formula = replace_braced(formula, "\\text{", |inner| inner.to_string());
    let formula = replace_braced(&formula, "\\boxed{", |inner| format!("[{inner}]"));
    let formula = formula.replace("\\,", " ");
    replace_control_words(&formula)
}

/// Rewrites every `command<inner>}` with a non-empty, brace-free interior.
fn replace_braced(input: &str, command: &str, wrap: impl Fn(&str) -> String) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;
    let mut search = 0;

    while let Some(offset) = memmem::find(&bytes[search..], command.as_bytes()) {
        let start = search + offset;
        let inner_start = start + command.len();
        match memchr(b'}', &bytes[inner_start..]) {
            Some(len) if len > 0 => {
                out.push_str(&input[cursor..start]);
                out.push_str(&wrap(&input[inner_start..inner_start + len]));
                cursor = inner_start + len + 1;
                search = cursor;
            }
            _ => search = inner_start,
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn replace_control_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(slash) = rest.find('\\') {
        out.push_str(&rest[..slash]);
        let after = &rest[slash + 1..];
        let word_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        let word = &after[..word_len];
        match symbol_for(word) {
            Some(symbol) if word_len > 0 => out.push_str(symbol),
            _ => {
                out.push('\\');
                out.push_str(word);
            }
        }
        rest = &after[word_len..];
    }

    out.push_str(rest);
    out
}
