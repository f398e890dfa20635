use crate::normalize::Normalizer;
use crate::info_log;
use clap::ValueEnum;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_DICTIONARY: &str = "/usr/share/dict/words";

/// Character encoding of a dictionary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Encoding {
    /// Invalid sequences become U+FFFD instead of failing the whole file.
    #[default]
    Utf8,
    /// ISO-8859-1, every byte is one character.
    Latin1,
}

impl Encoding {
    /// Decode one line, without its line ending.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes),
            Self::Latin1 => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// Where a dictionary comes from and how its lines are turned into candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictSpec {
    pub path: PathBuf,
    pub display: String,
    pub normalizer: Normalizer,
    pub encoding: Encoding,
}

impl DictSpec {
    /// Displayed under the file name.
    pub fn new<P: AsRef<Path>>(path: P, normalizer: Normalizer) -> Self {
        let path = path.as_ref().to_path_buf();
        let display = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            path,
            display,
            normalizer,
            encoding: Encoding::default(),
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictStatus {
    Active,
    Inactive,
    Failed(String),
}

/// A loaded word list: normalized, de-duplicated and sorted.
#[derive(Debug, Clone)]
pub struct Dictionary {
    spec: DictSpec,
    words: Vec<String>,
    status: DictStatus,
    in_memory: bool,
}

impl Dictionary {
    /// Loads the file right away. A missing or unreadable file is not an
    /// error here; the dictionary is marked as failed and stays empty.
    #[must_use]
    pub fn open(spec: DictSpec) -> Self {
        let mut dict = Self {
            spec,
            words: Vec::new(),
            status: DictStatus::Active,
            in_memory: false,
        };
        dict.reload();
        dict
    }

    /// A dictionary backed by an in-memory list instead of a file.
    #[must_use]
    pub fn from_words(display: &str, words: Vec<String>) -> Self {
        let mut spec = DictSpec::new(display, Normalizer::Identity);
        spec.display = display.to_string();
        Self {
            spec,
            words: dedup_sorted(words),
            status: DictStatus::Active,
            in_memory: true,
        }
    }

    /// Re-read the file. The active/inactive choice survives a reload; a
    /// failed dictionary becomes active again once the file can be read.
    pub fn reload(&mut self) {
        if self.in_memory {
            return;
        }
        match load_words_from_file(&self.spec.path, self.spec.normalizer, self.spec.encoding) {
            Ok(words) => {
                info_log!("Loaded {} entries from {}", words.len(), self.spec.path.display());
                self.words = words;
                if matches!(self.status, DictStatus::Failed(_)) {
                    self.status = DictStatus::Active;
                }
            }
            Err(e) => {
                log::warn!("Failed to load {}: {e}", self.spec.path.display());
                self.words.clear();
                self.status = DictStatus::Failed(e.to_string());
            }
        }
    }

    pub fn activate(&mut self) {
        self.status = DictStatus::Active;
        self.reload();
    }

    /// Stops contributing candidates but keeps the loaded words.
    pub fn deactivate(&mut self) {
        self.status = DictStatus::Inactive;
    }

    pub fn toggle(&mut self) {
        if self.is_active() {
            self.deactivate();
        } else {
            self.activate();
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DictStatus::Active
    }

    #[must_use]
    pub fn status(&self) -> &DictStatus {
        &self.status
    }

    #[must_use]
    pub fn spec(&self) -> &DictSpec {
        &self.spec
    }

    /// Words to filter; empty unless the dictionary is active.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        if self.is_active() { &self.words } else { &[] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec.display)?;
        match &self.status {
            DictStatus::Active => Ok(()),
            DictStatus::Inactive => write!(f, " (inactive)"),
            DictStatus::Failed(e) => write!(f, " ERROR: {e}"),
        }
    }
}

fn dedup_sorted(words: Vec<String>) -> Vec<String> {
    words.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

pub fn load_words_from_str(data: &str, normalizer: Normalizer) -> Vec<String> {
    dedup_sorted(data.lines().flat_map(|line| normalizer.normalize(line)).collect())
}

pub fn load_words_from_file<P: AsRef<Path>>(
    path: P,
    normalizer: Normalizer,
    encoding: Encoding,
) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.split(b'\n') {
        words.extend(normalizer.normalize(&encoding.decode(&line?)));
    }
    Ok(dedup_sorted(words))
}

/// Newline-delimited, one candidate per line.
pub fn write_wordlist<P: AsRef<Path>>(path: P, words: &[String]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for word in words {
        writeln!(writer, "{word}")?;
    }
    writer.flush()
}
