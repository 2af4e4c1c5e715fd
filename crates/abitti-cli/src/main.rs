use abitti_core::{DumpOpts, Exam, QuestionKind};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Component, Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "abitti",
    about = "Inspect and normalize Abitti exam archives",
    version
)]
struct Cli {
    /// Log debug events to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the exam content record as JSON
    Dump(DumpArgs),
    /// Summarize title, questions and attachments
    Info(ExamArgs),
    /// Renumber ids and display numbers and write a new archive
    Normalize(NormalizeArgs),
    /// List attachments, optionally extracting them
    Attachments(AttachmentArgs),
}

#[derive(ClapArgs, Debug)]
struct ExamArgs {
    /// Exam archive to load
    path: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct DumpArgs {
    /// Exam archive to load
    path: PathBuf,
    /// Single-line output instead of pretty JSON
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(ClapArgs, Debug)]
struct NormalizeArgs {
    /// Exam archive to load
    path: PathBuf,
    /// Output archive path
    #[arg(long, value_name = "EXAM")]
    out: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct AttachmentArgs {
    /// Exam archive to load
    path: PathBuf,
    /// Directory to write attachment files into
    #[arg(long, value_name = "DIR")]
    extract: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Dump(a) => cmd_dump(a),
        Cmd::Info(a) => cmd_info(a),
        Cmd::Normalize(a) => cmd_normalize(a),
        Cmd::Attachments(a) => cmd_attachments(a),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_or_exit(path: &Path) -> Exam {
    Exam::load(path).unwrap_or_else(|e| {
        eprintln!("error: {}: {}", path.display(), e);
        std::process::exit(2);
    })
}

fn cmd_dump(args: DumpArgs) {
    let opts = DumpOpts {
        pretty: !args.compact,
    };
    match abitti_core::dump_file_json(&args.path, opts) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
}

fn cmd_info(args: ExamArgs) {
    let exam = load_or_exit(&args.path);
    let count = |k: QuestionKind| exam.questions.iter().filter(|q| q.kind() == k).count();
    println!("title\t{}", exam.title);
    println!("casForbidden\t{}", exam.cas_forbidden);
    println!(
        "questions\t{}\t({} {}, {} {})",
        exam.questions.len(),
        count(QuestionKind::Text),
        QuestionKind::Text,
        count(QuestionKind::ChoiceGroup),
        QuestionKind::ChoiceGroup
    );
    println!("entities\t{}", exam.entity_count());
    match &exam.attachments {
        Some(files) => println!("attachments\t{}", files.len()),
        None => println!("attachments\tnone"),
    }
}

fn cmd_normalize(args: NormalizeArgs) {
    let mut exam = load_or_exit(&args.path);
    if exam.attachments.is_some() {
        eprintln!("warning: attachments are not carried over to {}", args.out.display());
    }
    exam.save(&args.out).unwrap_or_else(|e| {
        eprintln!("write error: {}", e);
        std::process::exit(4);
    });
    println!(
        "wrote {} ({} questions, {} entities)",
        args.out.display(),
        exam.questions.len(),
        exam.entity_count()
    );
}

fn cmd_attachments(args: AttachmentArgs) {
    let exam = load_or_exit(&args.path);
    let Some(files) = exam.attachments else {
        println!("no attachments");
        return;
    };
    for (name, data) in &files {
        println!("{}\t{}", name, data.len());
    }
    let Some(dir) = args.extract else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("error creating {}: {}", dir.display(), e);
        std::process::exit(5);
    }
    for (name, data) in &files {
        let Some(dest) = safe_join(&dir, name) else {
            eprintln!("skipping unsafe attachment name: {}", name);
            continue;
        };
        if let Some(parent) = dest.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            eprintln!("error creating {}: {}", parent.display(), e);
            std::process::exit(5);
        }
        if let Err(e) = std::fs::write(&dest, data) {
            eprintln!("error writing {}: {}", dest.display(), e);
            std::process::exit(5);
        }
    }
}

// Attachment names come from the archive; only plain relative paths are written.
fn safe_join(dir: &Path, name: &str) -> Option<PathBuf> {
    let rel = Path::new(name);
    if rel.as_os_str().is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(dir.join(rel))
}
