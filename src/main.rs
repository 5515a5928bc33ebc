use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
mod auth;
use notelock::crypto::{assess_password, generate_password, password::DEFAULT_GENERATED_LEN};
use notelock::{
    CryptoError, Note, NoteError, Notebook, Storage, decrypt_text, default_storage, encrypt_text,
    sort_for_display, text,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ENCRYPT_FAILED: &str = "failed to encrypt note";
const DECRYPT_FAILED: &str = "incorrect password or corrupted data";

fn resolve_storage(path: Option<PathBuf>) -> Result<Storage> {
    match path {
        Some(p) => Ok(Storage::new(p)),
        None => default_storage(),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("NOTELOCK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Parser)]
#[command(name = "notelock")]
#[command(version, about = "Offline notes with per-note password encryption.")]
struct Cli {
    /// Path to the notes file
    #[arg(long, global = true, value_name = "PATH", env = "NOTELOCK_PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Creates a note
    New {
        #[arg(short, long, default_value = "")]
        title: String,
        /// HTML content
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Lists notes, pinned first
    List {
        /// Only notes carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Case-insensitive search; encrypted notes match on tags and date only
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Prints a note
    #[command(arg_required_else_help = true)]
    Show { id: String },

    /// Changes title, content or tags of a note
    #[command(arg_required_else_help = true)]
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        /// Replaces all tags
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },

    /// Deletes a note
    #[command(arg_required_else_help = true)]
    Delete { id: String },

    /// Pins or unpins a note
    #[command(arg_required_else_help = true)]
    Pin { id: String },

    /// Lists all tags in use
    Tags,

    /// Word count, character count and reading time
    #[command(arg_required_else_help = true)]
    Stats { id: String },

    /// Encrypts a note's title and content with a password
    #[command(arg_required_else_help = true)]
    Encrypt { id: String },

    /// Decrypts a note with its password
    #[command(arg_required_else_help = true)]
    Decrypt { id: String },

    /// Encrypts text and prints the envelope
    #[command(arg_required_else_help = true)]
    Seal { text: String },

    /// Decrypts an envelope and prints the text
    #[command(arg_required_else_help = true)]
    Open { envelope: String },

    /// Prints a random password
    GenPassword {
        #[arg(short, long, default_value_t = DEFAULT_GENERATED_LEN)]
        length: usize,
    },

    /// Rates the strength of a password
    CheckPassword,
}

fn display_title(note: &Note) -> &str {
    if note.is_encrypted() {
        "[encrypted]"
    } else {
        note.title()
    }
}

fn short_id(note: &Note) -> String {
    note.id().to_string()[..8].to_string()
}

fn print_notes(notes: &[&Note]) {
    if notes.is_empty() {
        println!("No notes.");
        return;
    }

    let title_width = notes
        .iter()
        .map(|n| display_title(n).chars().count())
        .chain(std::iter::once("Title".len()))
        .max()
        .unwrap_or(5);

    println!("{:<8}  {:<3}  {:<title_width$}  Tags", "Id", "", "Title");
    println!("{:-<8}  {:-<3}  {:-<title_width$}  {:-<4}", "", "", "", "");
    for n in notes {
        let flags = format!(
            "{}{}",
            if n.is_pinned() { "*" } else { " " },
            if n.is_encrypted() { "E" } else { " " }
        );
        println!(
            "{:<8}  {:<3}  {:<title_width$}  {}",
            short_id(n),
            flags,
            display_title(n),
            n.tags().join(", ")
        );
    }
}

/// Hides which of password or data was wrong.
fn decrypt_failure(err: NoteError) -> anyhow::Error {
    match err {
        NoteError::Crypto(CryptoError::AuthenticationFailure | CryptoError::MalformedEnvelope(_)) => {
            anyhow!(DECRYPT_FAILED)
        }
        other => other.into(),
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Cli::parse();

    match args.command {
        Commands::New {
            title,
            content,
            tags,
        } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.store_mut().create(&title, &content, tags).id();
            nb.save()?;
            println!("created note {id}");
        }
        Commands::List { tag, search } => {
            let nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let mut notes = nb.store().search(search.as_deref().unwrap_or(""));
            if let Some(tag) = tag {
                notes.retain(|n| n.tags().iter().any(|t| t.eq_ignore_ascii_case(&tag)));
            }
            sort_for_display(&mut notes);
            print_notes(&notes);
        }
        Commands::Show { id } => {
            let nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let note = nb.find(&id)?;
            if note.is_encrypted() {
                println!("note {} is encrypted; run `notelock decrypt {id}`", note.id());
            } else {
                println!("{}\n", note.title());
                println!("{}", text::plain_text(note.content()));
            }
        }
        Commands::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.resolve(&id)?;
            nb.store_mut()
                .update(id, title.as_deref(), content.as_deref(), tags)?;
            nb.save()?;
            println!("note {id} updated");
        }
        Commands::Delete { id } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.resolve(&id)?;
            nb.store_mut().delete(id)?;
            nb.save()?;
            println!("note {id} deleted");
        }
        Commands::Pin { id } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.resolve(&id)?;
            let pinned = nb.store_mut().toggle_pin(id)?;
            nb.save()?;
            println!("note {}", if pinned { "pinned" } else { "unpinned" });
        }
        Commands::Tags => {
            let nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            for tag in nb.store().tags() {
                println!("{tag}");
            }
        }
        Commands::Stats { id } => {
            let nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let note = nb.find(&id)?;
            if note.is_encrypted() {
                println!("statistics are hidden while a note is encrypted");
            } else {
                println!("words: {}", note.word_count());
                println!("characters: {}", note.char_count());
                println!("reading time: {}", text::reading_time(note.content()));
            }
        }
        Commands::Encrypt { id } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.resolve(&id)?;
            let password = auth::read_new_password_with_confirmation()?;
            nb.store_mut()
                .encrypt(id, &password)
                .map_err(|e| match e {
                    NoteError::Crypto(_) => anyhow::Error::new(e).context(ENCRYPT_FAILED),
                    other => other.into(),
                })?;
            nb.save()?;
            println!("note {id} encrypted");
        }
        Commands::Decrypt { id } => {
            let mut nb = Notebook::open_with_storage(resolve_storage(args.store)?)?;
            let id = nb.resolve(&id)?;
            let password = auth::read_password()?;
            nb.store_mut()
                .decrypt(id, &password)
                .map_err(decrypt_failure)?;
            nb.save()?;
            println!("note {id} decrypted");
        }
        Commands::Seal { text } => {
            let password = auth::read_password()?;
            println!("{}", encrypt_text(&text, &password)?);
        }
        Commands::Open { envelope } => {
            let password = auth::read_password()?;
            let plaintext = decrypt_text(envelope.trim(), &password)
                .map_err(|e| decrypt_failure(e.into()))?;
            println!("{}", plaintext.as_str());
        }
        Commands::GenPassword { length } => {
            println!("{}", generate_password(length)?.as_str());
        }
        Commands::CheckPassword => {
            let password = auth::read_password()?;
            let report = assess_password(&password);
            println!("strength: {:?} ({}/5)", report.strength, report.score);
            println!("acceptable: {}", if report.is_valid { "yes" } else { "no" });
        }
    }

    Ok(())
}
