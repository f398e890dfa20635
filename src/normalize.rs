//! Dictionary entry normalization.

use clap::ValueEnum;

// Applied in order after case folding.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("ö", "oe"),
    ("ä", "ae"),
    ("ü", "ue"),
    ("ß", "ss"),
    ("æ", "ae"),
    ("â", "a"),
    ("à", "a"),
    ("á", "a"),
    ("ã", "a"),
    ("å", "a"),
    ("é", "e"),
    ("ê", "e"),
    ("è", "e"),
    ("ë", "e"),
    ("í", "i"),
    ("ì", "i"),
    ("î", "i"),
    ("ï", "i"),
    ("ó", "o"),
    ("ò", "o"),
    ("ô", "o"),
    ("ø", "o"),
    ("ù", "u"),
    ("ú", "u"),
    ("û", "u"),
    ("ñ", "n"),
    ("ç", "c"),
];

const STRIPPED: &[char] = &['\n', '\r', '-', ' ', '.', ':', ',', '+', '(', ')', '/'];

// Street-name abbreviations, expanded in both directions.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("strasse", "str"),
    ("hauptbahnhof", "hbf"),
    ("bahnhof", "bf"),
];

/// How raw dictionary lines become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Normalizer {
    /// Keep each line as is, minus surrounding whitespace.
    #[value(name = "none")]
    Identity,
    /// Lowercase ASCII letters and digits only.
    #[default]
    Ascii,
    /// Like `ascii`, plus common street-name abbreviations.
    Streets,
}

impl Normalizer {
    /// All candidates produced by one dictionary line.
    #[must_use]
    pub fn normalize(self, line: &str) -> Vec<String> {
        match self {
            Self::Identity => {
                let entry = line.trim();
                if entry.is_empty() {
                    Vec::new()
                } else {
                    vec![entry.to_string()]
                }
            }
            Self::Ascii => normalize_to_ascii(line),
            Self::Streets => normalize_streets(line),
        }
    }
}

/// The whole entry plus its `/`- and space-separated parts, each folded to ASCII.
#[must_use]
pub fn normalize_to_ascii(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut parts = vec![line];
    if line.contains('/') {
        parts.extend(line.split('/'));
    }
    if line.contains(' ') {
        parts.extend(line.split(' '));
    }
    parts.into_iter().filter_map(fold_to_ascii).collect()
}

fn fold_to_ascii(entry: &str) -> Option<String> {
    let mut folded = entry.to_lowercase();
    for &(from, to) in REPLACEMENTS {
        if folded.contains(from) {
            folded = folded.replace(from, to);
        }
    }
    folded.retain(|c| !STRIPPED.contains(&c));

    if folded.is_empty() || !folded.is_ascii() {
        return None;
    }
    if !folded.chars().all(|c| c.is_ascii_alphanumeric()) {
        log::warn!("Dropping entry '{entry}': '{folded}' is not alphanumeric");
        return None;
    }
    Some(folded)
}

#[must_use]
pub fn normalize_streets(line: &str) -> Vec<String> {
    let base = normalize_to_ascii(line);
    let mut out = base.clone();
    for entry in &base {
        for &(long, short) in ABBREVIATIONS {
            if let Some(stem) = entry.strip_suffix(long) {
                out.push(format!("{stem}{short}"));
            }
            if let Some(stem) = entry.strip_suffix(short) {
                out.push(format!("{stem}{long}"));
            }
        }
    }
    out
}
