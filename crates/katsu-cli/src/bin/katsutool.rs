use std::collections::BTreeMap;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use katsu_cli::corpus::{self, Status};
use katsu_core::conjugation::Conjugation;
use katsu_core::grammar::ConjugationTable;

#[derive(Parser)]
#[command(name = "katsutool", about = "Conjugation table diagnostics")]
struct Cli {
    /// Path to a grammar file in JUMAN katuyou format (default: bundled grammar)
    #[arg(long, global = true)]
    grammar: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform a conjugated surface into a target form
    Conjugate {
        /// Conjugated surface to start from
        surface: String,
        /// Conjugation type of the word
        #[arg(value_name = "TYPE")]
        conj_type: String,
        /// Form the surface is currently in
        form: String,
        /// Form to produce
        target: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recover the stem and list every form reachable from a surface
    Forms {
        /// Conjugated surface to start from
        surface: String,
        /// Conjugation type of the word
        #[arg(value_name = "TYPE")]
        conj_type: String,
        /// Form the surface is currently in
        form: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the loaded conjugation types, or dump one type's endings
    Inspect {
        /// Dump a single conjugation type instead of listing all
        #[arg(long = "type", value_name = "TYPE")]
        conj_type: Option<String>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run conjugation accuracy tests from a structured TOML corpus
    Accuracy {
        /// Path to the accuracy corpus TOML file
        corpus_file: String,
        /// Filter by category (only run cases in this category)
        #[arg(long)]
        category: Option<String>,
        /// Show passing cases too (default: only failures and skips)
        #[arg(long)]
        verbose: bool,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
struct ConjugateOutput {
    surface: String,
    #[serde(rename = "type")]
    conj_type: String,
    form: String,
    target: String,
    stem: String,
    path: usize,
    result: String,
}

#[derive(Debug, Serialize)]
struct FormsOutput {
    surface: String,
    #[serde(rename = "type")]
    conj_type: String,
    form: String,
    stem: String,
    path: usize,
    forms: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FormDump {
    form: String,
    endings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TypeDump {
    #[serde(rename = "type")]
    name: String,
    forms: Vec<FormDump>,
}

#[derive(Debug, Serialize)]
struct TypeSummary {
    #[serde(rename = "type")]
    name: String,
    forms: usize,
    paths: usize,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn load_grammar(grammar: Option<&str>) -> ConjugationTable {
    match grammar {
        Some(path) => ConjugationTable::open(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("Failed to open grammar at {}: {}", path, e);
            process::exit(1);
        }),
        None => ConjugationTable::bundled().clone(),
    }
}

fn resolve<'a>(
    table: &'a ConjugationTable,
    surface: &str,
    conj_type: &str,
    form: &str,
) -> Conjugation<'a> {
    Conjugation::new(table, surface, conj_type, form).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    })
}

/// Pad a label with spaces to `width` display columns.
fn pad_label(label: &str, width: usize) -> String {
    let display_width = UnicodeWidthStr::width(label);
    if display_width < width {
        format!("{}{}", label, " ".repeat(width - display_width))
    } else {
        label.to_string()
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let table = load_grammar(cli.grammar.as_deref());

    match cli.command {
        Command::Conjugate {
            surface,
            conj_type,
            form,
            target,
            json,
        } => {
            let mut conj = resolve(&table, &surface, &conj_type, &form);
            let stem = conj
                .stem()
                .unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                })
                .to_string();
            let result = conj.transform(&target).unwrap_or_else(|e| {
                eprintln!("{}", e);
                process::exit(1);
            });

            if json {
                let output = ConjugateOutput {
                    surface,
                    conj_type,
                    form,
                    target,
                    stem,
                    path: conj.path_index(),
                    result,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).expect("JSON serialization failed")
                );
            } else {
                println!("{}", result);
            }
        }

        Command::Forms {
            surface,
            conj_type,
            form,
            json,
        } => {
            let mut conj = resolve(&table, &surface, &conj_type, &form);
            let stem = conj
                .stem()
                .unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    process::exit(1);
                })
                .to_string();
            let forms = conj.all_forms().unwrap_or_else(|e| {
                eprintln!("{}", e);
                process::exit(1);
            });

            if json {
                let output = FormsOutput {
                    surface,
                    conj_type,
                    form,
                    stem,
                    path: conj.path_index(),
                    forms: forms.into_iter().collect(),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).expect("JSON serialization failed")
                );
            } else if let Some(declared) = table.forms_of(&conj_type) {
                // print in grammar declaration order, not map order
                let label_width = declared
                    .names()
                    .filter(|name| forms.contains_key(*name))
                    .map(UnicodeWidthStr::width)
                    .max()
                    .unwrap_or(0);
                for name in declared.names() {
                    if let Some(realized) = forms.get(name) {
                        println!("{}  {}", pad_label(name, label_width), realized);
                    }
                }
            }
        }

        Command::Inspect { conj_type, json } => match conj_type {
            Some(name) => {
                let Some(declared) = table.forms_of(&name) else {
                    eprintln!("undefined conjugation type {}", name);
                    process::exit(1);
                };

                if json {
                    let output = TypeDump {
                        name,
                        forms: declared
                            .names()
                            .map(|form| {
                                let endings = declared
                                    .get(form)
                                    .unwrap_or_default()
                                    .iter()
                                    .map(|e| e.source_token())
                                    .collect();
                                FormDump {
                                    form: form.to_string(),
                                    endings,
                                }
                            })
                            .collect(),
                    };
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&output).expect("JSON serialization failed")
                    );
                } else {
                    println!("{} ({} forms)", name, declared.len());
                    let label_width = declared
                        .names()
                        .map(UnicodeWidthStr::width)
                        .max()
                        .unwrap_or(0);
                    for form in declared.names() {
                        let endings: Vec<String> = declared
                            .get(form)
                            .unwrap_or_default()
                            .iter()
                            .map(|e| e.source_token())
                            .collect();
                        println!("  {}  {}", pad_label(form, label_width), endings.join(" "));
                    }
                }
            }
            None => {
                let mut types: Vec<(&str, usize, usize)> = table
                    .types()
                    .map(|(name, forms)| (name, forms.len(), forms.path_count()))
                    .collect();
                types.sort_unstable();

                if json {
                    let output: Vec<TypeSummary> = types
                        .into_iter()
                        .map(|(name, forms, paths)| TypeSummary {
                            name: name.to_string(),
                            forms,
                            paths,
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&output).expect("JSON serialization failed")
                    );
                } else {
                    let label_width = types
                        .iter()
                        .map(|(name, _, _)| UnicodeWidthStr::width(*name))
                        .max()
                        .unwrap_or(0);
                    for (name, forms, paths) in &types {
                        println!(
                            "{}  {} forms, {} paths",
                            pad_label(name, label_width),
                            forms,
                            paths
                        );
                    }
                }
            }
        },

        Command::Accuracy {
            corpus_file,
            category,
            verbose,
            json,
        } => {
            let mut corpus = corpus::load(Path::new(&corpus_file)).unwrap_or_else(|e| {
                eprintln!("Failed to read corpus file {}: {}", corpus_file, e);
                process::exit(1);
            });

            if let Some(ref category) = category {
                corpus.cases.retain(|case| case.category == *category);
            }
            if corpus.cases.is_empty() {
                eprintln!("No cases match the given filters");
                process::exit(1);
            }

            let report = corpus::run(&table, &corpus);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).expect("JSON serialization failed")
                );
            } else {
                let mut grouped: BTreeMap<&str, Vec<&corpus::CaseResult>> = BTreeMap::new();
                for r in &report.results {
                    grouped.entry(&r.category).or_default().push(r);
                }

                for (cat, group) in &grouped {
                    println!("\n=== {} ({} cases) ===", cat, group.len());
                    for r in group {
                        match r.status {
                            Status::Pass => {
                                if verbose {
                                    println!(
                                        "  \u{2713} {} {} \u{2192} {}: {}",
                                        r.surface,
                                        r.form,
                                        r.target,
                                        r.actual.as_deref().unwrap_or("")
                                    );
                                }
                            }
                            Status::Fail => {
                                let wanted = match (&r.expected, &r.expect_error) {
                                    (Some(expected), _) => expected.clone(),
                                    (None, Some(fragment)) => {
                                        format!("error containing {:?}", fragment)
                                    }
                                    (None, None) => "an expected outcome".to_string(),
                                };
                                println!(
                                    "  \u{2717} {} {} \u{2192} {}: expected {} (got: {})",
                                    r.surface,
                                    r.form,
                                    r.target,
                                    wanted,
                                    r.actual.as_deref().unwrap_or("nothing")
                                );
                            }
                            Status::Skip => {
                                let reason = r.note.as_deref().unwrap_or("known failure");
                                println!("  - {} [skip: {}]", r.surface, reason);
                            }
                        }
                    }
                }

                println!();
                println!("=== Summary ===");
                println!("  Total:     {}", report.summary.total);
                println!("  Pass:      {:>3}", report.summary.pass);
                println!("  Fail:      {:>3}", report.summary.fail);
                println!("  Skip:      {:>3}", report.summary.skip);
                println!(
                    "  Pass rate: {} ({}/{})",
                    report.summary.pass_rate,
                    report.summary.pass,
                    report.summary.tested()
                );
            }

            if report.summary.fail > 0 {
                process::exit(1);
            }
        }
    }
}
