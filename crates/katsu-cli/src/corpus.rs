//! Accuracy corpus loading and evaluation.
//!
//! A corpus is a TOML file of conjugation lookups with expected outcomes.
//! Each case names a surface, its conjugation type and form, and a target
//! form, and expects either a transformed surface or an error. Running a
//! corpus against a grammar table yields a report with per-case results
//! and a summary.

use std::fs;
use std::path::Path;

use katsu_core::conjugation::Conjugation;
use katsu_core::grammar::ConjugationTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corpus parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A test corpus as declared in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub cases: Vec<Case>,
}

/// One conjugation lookup with its expected outcome.
///
/// Exactly one of `expected` and `expect_error` should be set. `expected`
/// is the surface the transform should produce; `expect_error` is a
/// fragment the error message must contain.
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    pub surface: String,
    #[serde(rename = "type")]
    pub conj_type: String,
    pub form: String,
    pub target: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_category() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub surface: String,
    #[serde(rename = "type")]
    pub conj_type: String,
    pub form: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    pub status: Status,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
    pub pass_rate: String,
}

impl Summary {
    /// Cases that actually ran, skipped ones excluded.
    pub fn tested(&self) -> usize {
        self.pass + self.fail
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub results: Vec<CaseResult>,
    pub summary: Summary,
}

/// Read a corpus from a TOML file.
pub fn load(path: &Path) -> Result<Corpus, CorpusError> {
    let text = fs::read_to_string(path)?;
    let corpus = toml::from_str(&text)?;
    Ok(corpus)
}

/// Run every case in the corpus against the given grammar table.
pub fn run(table: &ConjugationTable, corpus: &Corpus) -> Report {
    let mut results = Vec::with_capacity(corpus.cases.len());
    let mut pass = 0;
    let mut fail = 0;
    let mut skip = 0;

    for case in &corpus.cases {
        let result = run_case(table, case);
        match result.status {
            Status::Pass => pass += 1,
            Status::Fail => fail += 1,
            Status::Skip => skip += 1,
        }
        results.push(result);
    }

    let tested = pass + fail;
    let rate = if tested > 0 {
        pass as f64 / tested as f64 * 100.0
    } else {
        0.0
    };

    Report {
        results,
        summary: Summary {
            total: corpus.cases.len(),
            pass,
            fail,
            skip,
            pass_rate: format!("{:.1}%", rate),
        },
    }
}

fn run_case(table: &ConjugationTable, case: &Case) -> CaseResult {
    let mut result = CaseResult {
        surface: case.surface.clone(),
        conj_type: case.conj_type.clone(),
        form: case.form.clone(),
        target: case.target.clone(),
        expected: case.expected.clone(),
        expect_error: case.expect_error.clone(),
        actual: None,
        status: Status::Fail,
        category: case.category.clone(),
        note: case.note.clone(),
    };

    if case.skip {
        result.status = Status::Skip;
        return result;
    }

    let outcome = Conjugation::new(table, &case.surface, &case.conj_type, &case.form)
        .and_then(|mut conj| conj.transform(&case.target));

    result.status = match (&outcome, &case.expect_error, &case.expected) {
        (Ok(actual), None, Some(expected)) => {
            result.actual = Some(actual.clone());
            if actual == expected {
                Status::Pass
            } else {
                Status::Fail
            }
        }
        (Ok(actual), Some(_), _) => {
            // expected a failure but the lookup went through
            result.actual = Some(actual.clone());
            Status::Fail
        }
        (Err(err), Some(fragment), _) => {
            let message = err.to_string();
            let status = if message.contains(fragment.as_str()) {
                Status::Pass
            } else {
                Status::Fail
            };
            result.actual = Some(format!("error: {}", message));
            status
        }
        (Err(err), None, _) => {
            result.actual = Some(format!("error: {}", err));
            Status::Fail
        }
        (Ok(actual), None, None) => {
            // a case with no expectation cannot pass
            result.actual = Some(actual.clone());
            Status::Fail
        }
    };

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(surface: &str, conj_type: &str, form: &str, target: &str) -> Case {
        Case {
            surface: surface.to_string(),
            conj_type: conj_type.to_string(),
            form: form.to_string(),
            target: target.to_string(),
            expected: None,
            expect_error: None,
            category: default_category(),
            skip: false,
            note: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let table = ConjugationTable::bundled();
        let mut passing = case("だ", "判定詞", "基本形", "デス列基本形");
        passing.expected = Some("です".to_string());
        let mut failing = case("だ", "判定詞", "基本形", "デス列基本形");
        failing.expected = Some("でした".to_string());
        let mut skipped = case("だ", "判定詞", "基本形", "ダ列タ形");
        skipped.expected = Some("だった".to_string());
        skipped.skip = true;

        let corpus = Corpus {
            cases: vec![passing, failing, skipped],
        };
        let report = run(table, &corpus);

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.pass, 1);
        assert_eq!(report.summary.fail, 1);
        assert_eq!(report.summary.skip, 1);
        assert_eq!(report.summary.tested(), 2);
        assert_eq!(report.summary.pass_rate, "50.0%");
        assert_eq!(report.results[0].status, Status::Pass);
        assert_eq!(report.results[1].status, Status::Fail);
        assert_eq!(report.results[2].status, Status::Skip);
        assert_eq!(report.results[2].actual, None);
    }

    #[test]
    fn test_expect_error_matches_message() {
        let table = ConjugationTable::bundled();
        let mut bad = case("すげえ", "イ形容詞アウオ段", "エ基本形", "基本形");
        bad.expect_error = Some("vowel-shifted".to_string());

        let corpus = Corpus { cases: vec![bad] };
        let report = run(table, &corpus);

        assert_eq!(report.summary.pass, 1);
        let actual = report.results[0].actual.as_deref().unwrap();
        assert!(actual.starts_with("error: "));
    }

    #[test]
    fn test_expect_error_fails_on_success() {
        let table = ConjugationTable::bundled();
        let mut bad = case("だ", "判定詞", "基本形", "ダ列タ形");
        bad.expect_error = Some("undefined".to_string());

        let corpus = Corpus { cases: vec![bad] };
        let report = run(table, &corpus);

        assert_eq!(report.summary.fail, 1);
        assert_eq!(report.results[0].actual.as_deref(), Some("だった"));
    }

    #[test]
    fn test_case_without_expectation_fails() {
        let table = ConjugationTable::bundled();
        let corpus = Corpus {
            cases: vec![case("だ", "判定詞", "基本形", "ダ列タ形")],
        };
        let report = run(table, &corpus);

        assert_eq!(report.summary.fail, 1);
        assert_eq!(report.results[0].actual.as_deref(), Some("だった"));
    }

    #[test]
    fn test_default_category() {
        let corpus: Corpus = toml::from_str(
            r#"
            [[cases]]
            surface = "だ"
            type = "判定詞"
            form = "基本形"
            target = "ダ列タ形"
            expected = "だった"
            "#,
        )
        .unwrap();

        assert_eq!(corpus.cases[0].category, "general");
        assert!(!corpus.cases[0].skip);
    }

    #[test]
    fn test_shipped_corpus_passes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/accuracy.toml");
        let corpus = load(&path).unwrap();
        let report = run(ConjugationTable::bundled(), &corpus);

        let failures: Vec<_> = report
            .results
            .iter()
            .filter(|r| r.status == Status::Fail)
            .map(|r| format!("{} {} {} -> {:?}", r.surface, r.form, r.target, r.actual))
            .collect();
        assert!(failures.is_empty(), "failing cases: {:?}", failures);
        assert!(report.summary.tested() > 0);
    }
}
