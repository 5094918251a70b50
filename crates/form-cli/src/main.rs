mod store_dir;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

use form_spec::{
    AnswerEntry, Form, FormStore, Question, SubmissionInput, answers_schema, response_stats,
    responses_to_csv, score, submit, validate,
};
use store_dir::DirStore;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const STORE_DIR_ENV: &str = "FORMFORGE_STORE_DIR";
const DEFAULT_STORE_DIR: &str = "./formforge-store";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form builder CLI",
    long_about = "Author multi-question forms, publish them, collect submissions, and inspect scores over a directory-backed document store"
)]
struct Cli {
    /// Directory holding the form and response documents (defaults to
    /// FORMFORGE_STORE_DIR or ./formforge-store).
    #[arg(long, value_name = "DIR", global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a form from a JSON description file.
    Create {
        /// JSON file with title, description, headerImage, and questions.
        #[arg(long, value_name = "INPUT")]
        input: PathBuf,
    },
    /// Replace a form's authored fields from a JSON description file.
    Update {
        #[arg(long, value_name = "ID")]
        form: String,
        #[arg(long, value_name = "INPUT")]
        input: PathBuf,
    },
    /// List stored forms, newest first.
    List,
    /// Print one form document.
    Show {
        #[arg(long, value_name = "ID")]
        form: String,
        /// Also print the authoring integrity report.
        #[arg(long)]
        check: bool,
    },
    /// Publish a form so it accepts submissions.
    Publish {
        #[arg(long, value_name = "ID")]
        form: String,
    },
    /// Revert a form to draft; new submissions are rejected.
    Unpublish {
        #[arg(long, value_name = "ID")]
        form: String,
    },
    /// Delete a form and its stored responses.
    Delete {
        #[arg(long, value_name = "ID")]
        form: String,
    },
    /// Check a submission file against a form without storing anything.
    Validate {
        #[arg(long, value_name = "ID")]
        form: String,
        /// JSON file: an array of answer entries, or a submission envelope.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Submit answers to a published form.
    Submit {
        #[arg(long, value_name = "ID")]
        form: String,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// List stored responses and aggregate statistics for a form.
    Responses {
        #[arg(long, value_name = "ID")]
        form: String,
    },
    /// Score stored responses against the form's correctness keys.
    Score {
        #[arg(long, value_name = "ID")]
        form: String,
        /// Score a single response instead of all of them.
        #[arg(long, value_name = "RESPONSE")]
        response: Option<String>,
    },
    /// Export a form's responses as CSV.
    Export {
        #[arg(long, value_name = "ID")]
        form: String,
        /// Write to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print the expected-answers JSON schema for a form.
    Schema {
        #[arg(long, value_name = "ID", required_unless_present = "document")]
        form: Option<String>,
        /// Emit the form document schema instead.
        #[arg(long)]
        document: bool,
    },
}

/// JSON description accepted by `create` and `update`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormInput {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    header_image: Option<String>,
    #[serde(default)]
    questions: Vec<Question>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let root = cli
        .store
        .or_else(|| env::var(STORE_DIR_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    let mut store = DirStore::open(&root)?;

    match cli.command {
        Command::Create { input } => run_create(&mut store, &input),
        Command::Update { form, input } => run_update(&mut store, &form, &input),
        Command::List => run_list(&store),
        Command::Show { form, check } => run_show(&store, &form, check),
        Command::Publish { form } => run_publish(&mut store, &form, true),
        Command::Unpublish { form } => run_publish(&mut store, &form, false),
        Command::Delete { form } => run_delete(&mut store, &form),
        Command::Validate { form, answers } => run_validate(&store, &form, &answers),
        Command::Submit { form, answers } => run_submit(&mut store, &form, &answers),
        Command::Responses { form } => run_responses(&store, &form),
        Command::Score { form, response } => run_score(&store, &form, response.as_deref()),
        Command::Export { form, out } => run_export(&store, &form, out.as_deref()),
        Command::Schema { form, document } => run_schema(&store, form.as_deref(), document),
    }
}

fn run_create(store: &mut DirStore, input: &Path) -> CliResult<()> {
    let input: FormInput = read_json_file(input)?;
    if input.title.trim().is_empty() {
        return Err("form title must not be empty".into());
    }

    let now = Utc::now();
    let mut form = Form::new(input.title, now);
    form.description = input.description;
    form.header_image = input.header_image;
    form.questions = input.questions;

    let saved = store.save_form(form, now)?;
    println!("Created form {}", saved.id);
    print_integrity_warnings(&saved);
    Ok(())
}

fn run_update(store: &mut DirStore, form_id: &str, input: &Path) -> CliResult<()> {
    let input: FormInput = read_json_file(input)?;
    if input.title.trim().is_empty() {
        return Err("form title must not be empty".into());
    }

    let mut form = store.load_form(form_id)?;
    form.title = input.title;
    form.description = input.description;
    form.header_image = input.header_image;
    form.questions = input.questions;

    let saved = store.save_form(form, Utc::now())?;
    println!("Updated form {}", saved.id);
    print_integrity_warnings(&saved);
    Ok(())
}

fn run_list(store: &DirStore) -> CliResult<()> {
    let forms = store.list_forms()?;
    if forms.is_empty() {
        println!("No forms stored.");
        return Ok(());
    }
    for form in forms {
        let status = if form.is_published {
            "published"
        } else {
            "draft"
        };
        println!(
            "{}  {}  [{}]  {} question(s)",
            form.id,
            form.title,
            status,
            form.questions.len()
        );
    }
    Ok(())
}

fn run_show(store: &DirStore, form_id: &str, check: bool) -> CliResult<()> {
    let form = store.load_form(form_id)?;
    println!("{}", serde_json::to_string_pretty(&form)?);
    if check {
        let report = form.integrity_report();
        if report.is_empty() {
            println!("No integrity findings.");
        } else {
            for (index, error) in report {
                println!("warning: Q{}: {}", index + 1, error);
            }
        }
    }
    Ok(())
}

fn run_publish(store: &mut DirStore, form_id: &str, published: bool) -> CliResult<()> {
    let mut form = store.load_form(form_id)?;
    form.set_published(published);
    let saved = store.save_form(form, Utc::now())?;
    if published {
        println!("Published form {}", saved.id);
    } else {
        println!("Form {} reverted to draft", saved.id);
    }
    Ok(())
}

fn run_delete(store: &mut DirStore, form_id: &str) -> CliResult<()> {
    store.delete_form(form_id)?;
    println!("Deleted form {form_id} and its responses");
    Ok(())
}

fn run_validate(store: &DirStore, form_id: &str, answers: &Path) -> CliResult<()> {
    let form = store.load_form(form_id)?;
    let entries = read_entries(answers, form_id)?;
    let accepted = validate(&form, &entries)?;
    println!("Submission OK: {} answered question(s)", accepted.len());
    Ok(())
}

fn run_submit(store: &mut DirStore, form_id: &str, answers: &Path) -> CliResult<()> {
    let entries = read_entries(answers, form_id)?;
    let response = submit(store, form_id, &entries, Utc::now())?;
    println!("Stored response {}", response.id);
    Ok(())
}

fn run_responses(store: &DirStore, form_id: &str) -> CliResult<()> {
    let form = store.load_form(form_id)?;
    let responses = store.load_responses(form_id)?;

    for response in &responses {
        println!(
            "{}  {}  {} answer(s)",
            response.id,
            response.submitted_at.format("%Y-%m-%d %H:%M:%S"),
            response.responses.len()
        );
    }

    let stats = response_stats(&form, &responses);
    println!("Total responses: {}", stats.total_responses);
    println!("Average score: {:.1}%", stats.average_score * 100.0);
    for question in &stats.per_question {
        println!(
            "Q{}: {} attempt(s), {:.1}% average",
            question.question_id + 1,
            question.attempts,
            question.average_fraction * 100.0
        );
    }
    Ok(())
}

fn run_score(store: &DirStore, form_id: &str, response_id: Option<&str>) -> CliResult<()> {
    let form = store.load_form(form_id)?;
    let mut responses = store.load_responses(form_id)?;
    if let Some(response_id) = response_id {
        responses.retain(|response| response.id == response_id);
        if responses.is_empty() {
            return Err(format!("no response '{response_id}' for form '{form_id}'").into());
        }
    }

    for response in &responses {
        let report = score(&form, response);
        println!("Response {}", response.id);
        for question in &report.per_question {
            if question.attempted_any() {
                println!(
                    "  Q{}: {}/{} attempted parts correct",
                    question.question_id + 1,
                    question.correct,
                    question.attempted
                );
            } else {
                println!("  Q{}: not attempted", question.question_id + 1);
            }
        }
        println!(
            "  Score: {:.1}% over {} attempted question(s)",
            report.aggregate * 100.0,
            report.attempted
        );
    }
    Ok(())
}

fn run_export(store: &DirStore, form_id: &str, out: Option<&Path>) -> CliResult<()> {
    let form = store.load_form(form_id)?;
    let responses = store.load_responses(form_id)?;
    let csv = responses_to_csv(&form, &responses);
    match out {
        Some(path) => {
            fs::write(path, csv)?;
            println!("Exported {} response(s) to {}", responses.len(), path.display());
        }
        None => println!("{csv}"),
    }
    Ok(())
}

fn run_schema(store: &DirStore, form_id: Option<&str>, document: bool) -> CliResult<()> {
    if document {
        let schema = schemars::schema_for!(Form);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let Some(form_id) = form_id else {
        return Err("--form is required unless --document is set".into());
    };
    let form = store.load_form(form_id)?;
    println!("{}", serde_json::to_string_pretty(&answers_schema(&form))?);
    Ok(())
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> CliResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}

/// An answers file is either a bare array of entries or a submission
/// envelope; an envelope naming a different form is rejected.
fn read_entries(path: &Path, form_id: &str) -> CliResult<Vec<AnswerEntry>> {
    let value: Value = read_json_file(path)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let input: SubmissionInput = serde_json::from_value(value)?;
    if !input.form_id.is_empty() && input.form_id != form_id {
        return Err(format!(
            "answers file targets form '{}', not '{}'",
            input.form_id, form_id
        )
        .into());
    }
    Ok(input.responses)
}

fn print_integrity_warnings(form: &Form) {
    for (index, error) in form.integrity_report() {
        println!("warning: Q{}: {}", index + 1, error);
    }
}
