//! RDF term model, sufficient for manifest and annotation-body graphs.

use std::fmt;

use crate::GraphError;

/// A literal value with its optional datatype IRI or language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }
}

/// One RDF term: an IRI, a blank node label, or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::plain(value))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

impl fmt::Display for Term {
    /// N-Triples rendition of the term.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => {
                write!(f, "\"{}\"", escape(&lit.lexical))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")?;
                } else if let Some(dt) = &lit.datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse a term from its N-Triples-ish display form (the form Sophia's
/// term types render to).
pub(crate) fn parse_term_display(term: &str) -> Result<Term, GraphError> {
    let s = term.trim();

    if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Term::Iri(rest.to_string()));
    }

    if let Some(rest) = s.strip_prefix("_:") {
        return Ok(Term::Blank(rest.to_string()));
    }

    if s.starts_with('"') {
        let mut end_quote = None;
        let mut prev_was_escape = false;
        for (i, ch) in s.char_indices().skip(1) {
            if ch == '"' && !prev_was_escape {
                end_quote = Some(i);
                break;
            }
            prev_was_escape = ch == '\\' && !prev_was_escape;
        }
        let Some(end) = end_quote else {
            return Err(GraphError::Term(s.to_string()));
        };

        let lexical = unescape(&s[1..end]);
        let rest = s[end + 1..].trim();

        let mut language = None;
        let mut datatype = None;
        if let Some(lang) = rest.strip_prefix('@') {
            language = Some(lang.to_string());
        } else if let Some(dt) = rest.strip_prefix("^^") {
            let dt = dt.trim();
            if let Some(dt_iri) = dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                datatype = Some(dt_iri.to_string());
            } else if !dt.is_empty() {
                datatype = Some(dt.to_string());
            }
        }

        return Ok(Term::Literal(Literal {
            lexical,
            datatype,
            language,
        }));
    }

    Err(GraphError::Term(s.to_string()))
}
