//! Conjugation-type table loaded from JUMAN-style grammar sources.
//!
//! A source is a sequence of records `(活用型 ((活用形 語尾...) ...))`.
//! Endings are classified once at load time: `*` becomes the empty literal
//! and a `-e` prefix becomes a vowel-shift ending. Irregular types list
//! parallel endings per form, one per spelling paradigm (カ変動詞来 has a
//! kana column and a kanji column).


use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::sexp::{self, Sexp, SexpError};

/// Token that marks an empty ending in grammar sources.
pub const EMPTY_ENDING: &str = "*";
/// Prefix that marks a vowel-shift ending in grammar sources.
pub const VOWEL_SHIFT_PREFIX: &str = "-e";

/// Grammar compiled into the library, a JUMAN-style 活用 table.
pub const BUNDLED_SOURCE: &str = include_str!("default.katuyou");

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("grammar parse error: {0}")]
    Sexp(#[from] SexpError),

    #[error("{path}: neither valid UTF-8 nor EUC-JP")]
    Decode { path: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

/// A form-specific suffix, classified once at table construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ending {
    /// Appended to the stem as-is. The empty literal marks the stem form.
    Literal(String),
    /// Shifts the stem-final kana to its e-row counterpart before the
    /// payload is appended (すご + `-eえ` → すげえ).
    VowelShift(String),
}

impl Ending {
    fn from_token(token: &str) -> Ending {
        if token == EMPTY_ENDING {
            Ending::Literal(String::new())
        } else if let Some(payload) = token.strip_prefix(VOWEL_SHIFT_PREFIX) {
            Ending::VowelShift(payload.to_string())
        } else {
            Ending::Literal(token.to_string())
        }
    }

    pub fn is_vowel_shift(&self) -> bool {
        matches!(self, Ending::VowelShift(_))
    }

    /// The spelling this ending has in grammar sources.
    pub fn source_token(&self) -> String {
        match self {
            Ending::Literal(s) if s.is_empty() => EMPTY_ENDING.to_string(),
            Ending::Literal(s) => s.clone(),
            Ending::VowelShift(payload) => format!("{}{}", VOWEL_SHIFT_PREFIX, payload),
        }
    }
}

/// One conjugation type's forms: name → endings, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FormTable {
    endings: HashMap<String, Vec<Ending>>,
    order: Vec<String>,
}

impl FormTable {
    pub fn get(&self, form: &str) -> Option<&[Ending]> {
        self.endings.get(form).map(Vec::as_slice)
    }

    pub fn contains(&self, form: &str) -> bool {
        self.endings.contains_key(form)
    }

    /// Form names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of parallel spelling paths, the longest ending list of any
    /// form. Single-spelling types have one path, dual-spelling irregular
    /// types two.
    pub fn path_count(&self) -> usize {
        self.endings.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Redefinition keeps the original position and takes the new endings.
    fn insert(&mut self, name: &str, endings: Vec<Ending>) -> bool {
        let replaced = self.endings.insert(name.to_string(), endings).is_some();
        if !replaced {
            self.order.push(name.to_string());
        }
        replaced
    }
}

/// The full table: conjugation type name → form table.
#[derive(Debug, Clone, Default)]
pub struct ConjugationTable {
    types: HashMap<String, FormTable>,
}

impl ConjugationTable {
    /// Build a table from parsed records.
    pub fn from_sexps(records: &[Sexp]) -> Result<ConjugationTable, GrammarError> {
        let mut types: HashMap<String, FormTable> = HashMap::new();
        for record in records {
            let items = record
                .as_list()
                .ok_or_else(|| malformed("expected a record list", record))?;
            let type_name = items
                .first()
                .and_then(Sexp::as_atom)
                .ok_or_else(|| malformed("record must start with a type name", record))?;
            if items.len() > 2 {
                return Err(malformed("record has trailing elements", record));
            }

            // A bare (型名) record is a type that never conjugates.
            let mut forms = FormTable::default();
            if let Some(form_records) = items.get(1) {
                let form_records = form_records
                    .as_list()
                    .ok_or_else(|| malformed("form records must be a list", record))?;
                for form_record in form_records {
                    let (name, endings) = parse_form_record(form_record)?;
                    if forms.insert(name, endings) {
                        warn!(
                            conj_type = type_name,
                            form = name,
                            "form redefined, later endings win"
                        );
                    }
                }
                check_path_counts(type_name, &forms);
            }

            if types.insert(type_name.to_string(), forms).is_some() {
                warn!(conj_type = type_name, "conjugation type redefined");
            }
        }
        Ok(ConjugationTable { types })
    }

    pub fn from_source(source: &str) -> Result<ConjugationTable, GrammarError> {
        let records = sexp::parse(source)?;
        ConjugationTable::from_sexps(&records)
    }

    /// Read a grammar file. UTF-8 first, then EUC-JP, the historical
    /// encoding of JUMAN grammar files.
    pub fn open(path: &Path) -> Result<ConjugationTable, GrammarError> {
        let bytes = fs::read(path)?;
        let source = match std::str::from_utf8(&bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                let (text, _, had_errors) = encoding_rs::EUC_JP.decode(&bytes);
                if had_errors {
                    return Err(GrammarError::Decode {
                        path: path.display().to_string(),
                    });
                }
                text.into_owned()
            }
        };
        let table = ConjugationTable::from_source(&source)?;
        debug!(
            types = table.len(),
            path = %path.display(),
            "loaded conjugation grammar"
        );
        Ok(table)
    }

    /// Get or initialize the table built from [`BUNDLED_SOURCE`].
    pub fn bundled() -> &'static ConjugationTable {
        static INSTANCE: OnceLock<ConjugationTable> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            ConjugationTable::from_source(BUNDLED_SOURCE).expect("bundled grammar must be valid")
        })
    }

    /// The form table of `conj_type`, if the type is defined.
    pub fn forms_of(&self, conj_type: &str) -> Option<&FormTable> {
        self.types.get(conj_type)
    }

    pub fn contains_type(&self, conj_type: &str) -> bool {
        self.types.contains_key(conj_type)
    }

    /// All defined types, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &FormTable)> {
        self.types.iter().map(|(name, forms)| (name.as_str(), forms))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn malformed(reason: &str, context: &Sexp) -> GrammarError {
    GrammarError::MalformedRecord(format!("{}: {}", reason, context))
}

fn parse_form_record(form_record: &Sexp) -> Result<(&str, Vec<Ending>), GrammarError> {
    let items = form_record
        .as_list()
        .ok_or_else(|| malformed("expected a form record list", form_record))?;
    let name = items
        .first()
        .and_then(Sexp::as_atom)
        .ok_or_else(|| malformed("form record must start with a form name", form_record))?;
    if items.len() < 2 {
        return Err(malformed("form record has no endings", form_record));
    }
    let mut endings = Vec::with_capacity(items.len() - 1);
    for item in &items[1..] {
        let token = item
            .as_atom()
            .ok_or_else(|| malformed("endings must be atoms", form_record))?;
        endings.push(Ending::from_token(token));
    }
    Ok((name, endings))
}

/// A form listing fewer endings than its siblings cannot realize every
/// spelling paradigm of the type. Lookup tolerates that, loading flags it.
fn check_path_counts(type_name: &str, forms: &FormTable) {
    let min = forms.endings.values().map(Vec::len).min();
    let max = forms.endings.values().map(Vec::len).max();
    if let (Some(min), Some(max)) = (min, max) {
        if min != max {
            warn!(
                conj_type = type_name,
                min, max, "uneven ending path counts across forms"
            );
        }
    }
}
