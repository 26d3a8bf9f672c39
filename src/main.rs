use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::debug;
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tradedoc::render::pdf::{default_engines, detect_engines};
use tradedoc::{
    DocumentRequest, JsonFileLedgerStore, Language, Ledger, PipelineBuilder, PipelineError, Settings,
    Transaction, resolve_template, tafqit,
};
use tradedoc_resource::FilesystemTemplateSource;

#[derive(Parser, Debug)]
#[command(version, about = "Generate invoices, packing lists, CMR notes and Form A certificates", long_about = None)]
struct Cli {
    /// Config file (default: $TRADEDOC_CONFIG, then ./tradedoc.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document for a transaction JSON file
    Render {
        /// Transaction JSON
        #[arg(value_name = "TRANSACTION")]
        transaction: PathBuf,
        /// Document code, e.g. invoice.commercial or packing_list.export.simple
        #[arg(short, long)]
        doc: String,
        #[arg(short, long, default_value = "en")]
        lang: Language,
        /// Write HTML only
        #[arg(long)]
        html_only: bool,
        /// Use this document number instead of {PREFIX}-{transaction}
        #[arg(long)]
        doc_no: Option<String>,
        /// Date for the output folder (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show which template a document code resolves to
    Resolve {
        #[arg(short, long)]
        doc: String,
        #[arg(short, long, default_value = "en")]
        lang: Language,
    },
    /// Allocate the next transaction number
    NextNumber,
    /// Reset the last transaction number to the highest one in use
    SyncNumbers,
    /// Spell an amount in words
    Tafqit {
        amount: Decimal,
        #[arg(short, long, default_value = "USD")]
        currency: String,
        #[arg(short, long, default_value = "en")]
        lang: Language,
    },
    /// List PDF engines and whether they are installed
    Engines,
}

fn main() -> Result<(), PipelineError> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = Settings::discover(cli.config.as_deref())?;
    debug!("Settings: {:?}", settings);

    match cli.command {
        Command::Render {
            transaction,
            doc,
            lang,
            html_only,
            doc_no,
            date,
        } => {
            let tx = Transaction::from_json(&fs::read_to_string(&transaction)?)?;
            let pipeline = PipelineBuilder::from_settings(&settings).build()?;

            let mut request = DocumentRequest::new(tx, doc, lang);
            if html_only {
                request = request.with_html_only(true);
            }
            if let Some(doc_no) = doc_no {
                request = request.with_doc_no(doc_no);
            }
            if let Some(date) = date {
                request = request.with_date(date);
            }

            let result = pipeline.render_document(request)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Resolve { doc, lang } => {
            let source = FilesystemTemplateSource::new(&settings.paths.templates);
            let spec = resolve_template(&source, &doc, lang)?;
            println!("{}", source.root().join(&spec.path).display());
            if let Some(extra) = spec.extra {
                println!("{}", serde_json::to_string_pretty(&extra)?);
            }
        }
        Command::NextNumber => {
            let ledger = Ledger::new(Arc::new(JsonFileLedgerStore::new(&settings.paths.ledger)));
            let prefix = settings.numbering.transaction_prefix.trim();
            if !prefix.is_empty() {
                ledger.set_prefix(prefix)?;
            }
            println!("{}", ledger.next_transaction_number_or_fallback());
        }
        Command::SyncNumbers => {
            let ledger = Ledger::new(Arc::new(JsonFileLedgerStore::new(&settings.paths.ledger)));
            println!("{}", ledger.sync_last_number()?);
        }
        Command::Tafqit { amount, currency, lang } => {
            println!("{}", tafqit(amount, &currency, lang));
        }
        Command::Engines => {
            for (kind, available) in detect_engines(&default_engines()) {
                let marker = if available { "available" } else { "missing" };
                let preferred = if kind == settings.pdf.prefer { " (preferred)" } else { "" };
                println!("{:<12} {}{}", kind.name(), marker, preferred);
            }
        }
    }
    Ok(())
}
