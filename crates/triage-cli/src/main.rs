use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use triage_core::{
    BulkScope, CategoryFilter, Criticality, Finding, FindingFilter, FindingId, PendingBulk, ReviewSession, Status,
    Theme,
};
use triage_hitl::{format_bulk_prompt, parse_bulk_answer, BulkAnswer};
use triage_runner::{doctor, Config, Reviewer, SetOutcome};

#[derive(Parser)]
#[command(name = "triage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create .triage/ with a default triage.toml
    Init,

    /// Check config, state store and the open review
    Doctor,

    /// Open a validation result for review
    Load {
        result: PathBuf,
        /// Source document the result was produced from
        #[arg(long)]
        source: Option<PathBuf>,
        /// File name to key saved statuses under (defaults to the source document's name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Progress and open findings per criticality
    Status,

    /// Findings grouped by code, field and description
    Groups {
        #[arg(long)]
        criticality: Option<Criticality>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        severity: Option<String>,
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// all, missing or content-error
        #[arg(long)]
        category: Option<CategoryFilter>,
        /// List the member findings of every group
        #[arg(long, default_value_t = false)]
        expand: bool,
    },

    /// Findings per theme with their dominant status
    Themes,

    /// Print one finding as JSON
    Show { id: String },

    /// Set the status of one finding
    Set {
        id: String,
        status: Status,
        /// Apply to every similar open finding without asking
        #[arg(long, conflicts_with = "only_this")]
        all_similar: bool,
        /// Apply to this finding only without asking
        #[arg(long)]
        only_this: bool,
    },

    /// Set the status of every finding in a group
    SetGroup { key: String, status: Status },

    /// Set the status of every finding in a theme
    SetTheme { theme: Theme, status: Status },

    /// Write a session file that can be imported later
    ExportSession {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the open review with an exported session
    ImportSession { file: PathBuf },

    /// Write the result with a status per finding
    ExportJson {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the findings with their status as CSV
    ExportCsv {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the chat request for a question about one finding
    ChatContext { id: String, message: String },

    /// Close the open review
    Close {
        /// Also delete the saved statuses
        #[arg(long, default_value_t = false)]
        forget: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let root = std::env::current_dir()?;

    match cli.cmd {
        Command::Init => {
            let path = Config::config_path(&root);
            if path.exists() {
                println!("Already initialized: {}", path.display());
            } else {
                Config::load_or_init(&root)?;
                println!("Initialized triage in {}", root.display());
            }
        }
        Command::Doctor => {
            let cfg = Config::load_or_init(&root)?;
            for line in doctor(&root, &cfg)? {
                println!("ok  {line}");
            }
            println!("OK");
        }
        Command::Load { result, source, name } => {
            let cfg = Config::load_or_init(&root)?;
            let parsed = triage_result::load_validation_result(&result)?;
            let name = name.or_else(|| source.as_deref().and_then(file_name_of));
            let source = match &source {
                Some(p) => Some(std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?),
                None => None,
            };
            let r = Reviewer::start(root, cfg, parsed, name.as_deref(), source)?;
            for d in r.diagnostics() {
                eprintln!("warning: {d}");
            }
            println!("Opened {}", r.session().identity().file_name);
            print_status(r.session());
        }
        Command::Status => {
            let r = open(root)?;
            println!("{}", r.session().identity().file_name);
            print_status(r.session());
        }
        Command::Groups {
            criticality,
            status,
            severity,
            engine,
            search,
            category,
            expand,
        } => {
            let mut r = open(root)?;
            let s = r.session_mut();
            s.set_filter(FindingFilter {
                criticality,
                status,
                severity,
                engine,
                text: search,
            });
            if let Some(c) = category {
                s.set_category(c);
            }
            print_groups(r.session(), expand);
        }
        Command::Themes => {
            let r = open(root)?;
            for t in r.session().theme_overview() {
                println!(
                    "{:<10} {:<36} {:>4} open / {:<4} {}",
                    t.theme.key(),
                    t.theme.display_name(),
                    t.open,
                    t.total,
                    t.dominant
                );
            }
        }
        Command::Show { id } => {
            let r = open(root)?;
            let id = FindingId::from_str(id);
            let (index, finding) = r.session().finding(&id).ok_or_else(|| anyhow!("unknown finding: {id}"))?;
            println!("#{index} {} [{}]", id, r.session().status_of(&id));
            println!("{}", serde_json::to_string_pretty(finding)?);
        }
        Command::Set {
            id,
            status,
            all_similar,
            only_this,
        } => {
            let mut r = open(root)?;
            let id = FindingId::from_str(id);
            let outcome = r.set_status(&id, status, |pending, finding| {
                if all_similar {
                    BulkAnswer::Apply(BulkScope::AllSimilar)
                } else if only_this {
                    BulkAnswer::Apply(BulkScope::ThisOnly)
                } else {
                    ask(pending, finding)
                }
            })?;
            match outcome {
                SetOutcome::Applied(changes) => println!("Set {} finding(s) to {}", changes.len(), status),
                SetOutcome::Cancelled { restored } => println!("Cancelled; {id} stays {restored}"),
            }
            print_status(r.session());
        }
        Command::SetGroup { key, status } => {
            let mut r = open(root)?;
            let changes = r.set_group_status(&key, status)?;
            println!("Set {} finding(s) to {}", changes.len(), status);
            print_status(r.session());
        }
        Command::SetTheme { theme, status } => {
            let mut r = open(root)?;
            let changes = r.set_theme_status(theme, status)?;
            println!("Set {} finding(s) in {} to {}", changes.len(), theme.display_name(), status);
            print_status(r.session());
        }
        Command::ExportSession { out } => {
            let r = open(root)?;
            println!("Wrote {}", r.export_session(out.as_deref())?.display());
        }
        Command::ImportSession { file } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let r = {
                let cfg = Config::load_or_init(&root)?;
                Reviewer::import(root, cfg, &raw)?
            };
            println!("Imported {}", r.session().identity().file_name);
            print_status(r.session());
        }
        Command::ExportJson { out } => {
            let r = open(root)?;
            println!("Wrote {}", r.export_json(out.as_deref())?.display());
        }
        Command::ExportCsv { out } => {
            let r = open(root)?;
            println!("Wrote {}", r.export_csv(out.as_deref())?.display());
        }
        Command::ChatContext { id, message } => {
            let r = open(root)?;
            let req = r.chat_request(&FindingId::from_str(id), &message)?;
            println!("{}", serde_json::to_string_pretty(&req)?);
        }
        Command::Close { forget } => {
            let r = open(root)?;
            let name = r.session().identity().file_name.clone();
            r.close(forget)?;
            if forget {
                println!("Closed {name}; saved statuses deleted");
            } else {
                println!("Closed {name}");
            }
        }
    }

    Ok(())
}

fn open(root: PathBuf) -> anyhow::Result<Reviewer> {
    let cfg = Config::load_or_init(&root)?;
    Reviewer::resume(root, cfg)
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn print_status(s: &ReviewSession) {
    let p = s.progress();
    let counts = s.summary_counts();
    println!("Progress: {}/{} handled ({}%)", p.handled, p.total, p.percentage);
    println!(
        "Open: {} KRITIEK, {} AANDACHT, {} INFO",
        counts.get(Criticality::Kritiek),
        counts.get(Criticality::Aandacht),
        counts.get(Criticality::Info)
    );
}

fn print_groups(s: &ReviewSession, expand: bool) {
    let groups = s.groups();
    if groups.is_empty() {
        println!("No findings match.");
        return;
    }
    let mut theme = None;
    for g in &groups {
        if theme != Some(g.theme) {
            theme = Some(g.theme);
            println!("== {} ==", g.theme.display_name());
        }
        println!(
            "{:<9} {} {:<12} {:>3}x  {:<12} {}",
            g.criticality,
            g.code,
            g.label,
            g.len(),
            g.dominant_status(s.store()),
            g.description
        );
        println!("          key: {}", g.key);
        if expand {
            for m in &g.members {
                println!("          - {} [{}] {}", m.id, s.status_of(&m.id), m.finding.waarde);
            }
        }
    }
}

/// Asks on stdin until the answer parses. End of input cancels.
fn ask(pending: &PendingBulk, finding: &Finding) -> BulkAnswer {
    println!("{}", format_bulk_prompt(pending, finding));
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        match lines.next() {
            Some(Ok(line)) => match parse_bulk_answer(&line) {
                Some(answer) => return answer,
                None => println!("Answer 1, 2 or 3."),
            },
            _ => return BulkAnswer::Cancel,
        }
    }
}
