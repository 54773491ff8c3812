//! weft CLI binary: one subcommand per demo flow.
//!
//! Subcommands: `chat`, `batch`, `parse`, `load <kind>`, `embed`, `rag`, `agent`, `probe`, `serve`.

mod log_format;
mod logging;

use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cli::{AgentOptions, LoadKind, ParseKind, DEFAULT_PROBE_INPUT};
use serde::Serialize;
use weft::loaders::UnknownHandling;
use weft::provider::{self, ProviderSettings};
use weft::rag::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_K};
use weft::{ChatOpenAI, Embedder, HashEmbedder, LlmClient, MockLlm};

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(about = "weft: prompts, parsers, loaders, RAG and a tool-calling HR agent")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Provider preset: openai, groq, mistral, gemini, cohere
    #[arg(long, global = true, env = "WEFT_PROVIDER", value_name = "NAME")]
    provider: Option<String>,

    /// Chat model (default: the provider preset)
    #[arg(long, global = true, env = "WEFT_MODEL", value_name = "MODEL")]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true, value_name = "T")]
    temperature: Option<f32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// No network: echo model and hashing embedder
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One chat turn: prompt | model | string
    Chat {
        /// System message
        #[arg(long, value_name = "TEXT")]
        system: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        input: Vec<String>,
    },
    /// Send several prompts concurrently
    Batch {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Run a prompt through an output parser: list, json, person, recipe
    Parse {
        kind: ParseKind,
        #[arg(required = true, trailing_var_arg = true)]
        input: Vec<String>,
    },
    /// Load documents and print them (or the error) as a report
    Load(LoadArgs),
    /// Embed texts and print `(count, dimension)`
    Embed {
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Answer a question from local files or web pages
    Rag {
        /// File (txt, md, csv, json, docx) or http(s) URL; repeatable
        #[arg(long = "source", short = 's', value_name = "PATH|URL", required = true)]
        sources: Vec<String>,
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Ask the HR assistant (tool-calling agent with per-thread memory)
    Agent {
        /// Conversation thread
        #[arg(long, default_value = "default", value_name = "ID")]
        thread_id: String,
        /// Employee records file (csv, json, txt); built-in sample when omitted
        #[arg(long, value_name = "PATH")]
        employees: Option<String>,
        /// SQLite checkpoint file; falls back to WEFT_CHECKPOINT_DB, else in-memory
        #[arg(long, value_name = "PATH")]
        checkpoint_db: Option<PathBuf>,
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Check which models answer
    Probe {
        /// Comma-separated model names (default: the provider's chat model)
        #[arg(long, value_delimiter = ',', value_name = "MODELS")]
        models: Vec<String>,
        #[arg(long, default_value = DEFAULT_PROBE_INPUT)]
        input: String,
    },
    /// HTTP server: POST /generate {input} -> {message}
    Serve {
        /// Listen address (default 127.0.0.1:5000)
        #[arg(long, value_name = "ADDR")]
        addr: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct LoadArgs {
    #[command(subcommand)]
    kind: LoadCommand,
    /// Split loaded documents into chunks of this size
    #[arg(long, global = true)]
    chunk_size: Option<usize>,
    #[arg(long, global = true, default_value_t = 0)]
    chunk_overlap: usize,
}

#[derive(Subcommand, Debug, Clone)]
enum LoadCommand {
    Text { path: String },
    Csv {
        path: String,
        #[arg(long, default_value_t = ',')]
        separator: char,
        /// Use only this column as page content
        #[arg(long)]
        column: Option<String>,
    },
    Json {
        path: String,
        /// JSON pointer selecting the strings to load, e.g. /texts
        #[arg(long)]
        pointer: Option<String>,
    },
    Docx { path: String },
    Web {
        url: String,
        #[arg(long, default_value = "p")]
        selector: String,
    },
    Github {
        url: String,
        #[arg(long, default_value = "main")]
        branch: String,
        #[arg(long)]
        recursive: bool,
        /// What to do with binary files: ignore, warn, error
        #[arg(long, default_value = "warn")]
        unknown: UnknownHandling,
    },
    Youtube {
        url: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long)]
        video_info: bool,
    },
}

impl From<LoadCommand> for LoadKind {
    fn from(cmd: LoadCommand) -> Self {
        match cmd {
            LoadCommand::Text { path } => LoadKind::Text { path },
            LoadCommand::Csv { path, separator, column } => LoadKind::Csv { path, separator, column },
            LoadCommand::Json { path, pointer } => LoadKind::Json { path, pointer },
            LoadCommand::Docx { path } => LoadKind::Docx { path },
            LoadCommand::Web { url, selector } => LoadKind::Web { url, selector },
            LoadCommand::Github { url, branch, recursive, unknown } => {
                LoadKind::Github { url, branch, recursive, unknown }
            }
            LoadCommand::Youtube { url, language, video_info } => {
                LoadKind::Youtube { url, language, video_info }
            }
        }
    }
}

fn settings(args: &Args) -> Result<ProviderSettings, BoxError> {
    let settings = ProviderSettings::resolve(args.provider.as_deref())?;
    Ok(match &args.model {
        Some(model) => settings.with_chat_model(model.clone()),
        None => settings,
    })
}

fn chat_client(args: &Args, settings: &ProviderSettings) -> Result<ChatOpenAI, BoxError> {
    let llm = provider::chat_model(settings)?;
    Ok(match args.temperature {
        Some(t) => llm.with_temperature(t),
        None => llm,
    })
}

fn llm(args: &Args) -> Result<Arc<dyn LlmClient>, BoxError> {
    if args.offline {
        return Ok(Arc::new(MockLlm::echo()));
    }
    Ok(Arc::new(chat_client(args, &settings(args)?)?))
}

fn embedder(args: &Args) -> Result<Arc<dyn Embedder>, BoxError> {
    if args.offline {
        return Ok(Arc::new(HashEmbedder::default()));
    }
    Ok(Arc::new(provider::embedder(&settings(args)?)?))
}

/// JSON when `--json`, else the text form.
fn emit<T: Serialize>(json: bool, value: &T, text: impl Display) -> Result<(), BoxError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), BoxError> {
    let json = args.json;
    match &args.cmd {
        Command::Chat { system, input } => {
            let reply = cli::chat(llm(&args)?, system.as_deref(), &input.join(" ")).await?;
            emit(json, &serde_json::json!({ "reply": reply }), &reply)
        }
        Command::Batch { inputs } => {
            let replies = cli::batch(llm(&args)?, inputs).await?;
            emit(json, &replies, replies.join("\n"))
        }
        Command::Parse { kind, input } => {
            let value = cli::parse(llm(&args)?, *kind, &input.join(" ")).await?;
            emit(json, &value, serde_json::to_string_pretty(&value)?)
        }
        Command::Load(load) => {
            let chunk = load.chunk_size.map(|size| (size, load.chunk_overlap));
            let kind = LoadKind::from(load.kind.clone());
            let report = cli::load(kind, chunk).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.success {
                Ok(())
            } else {
                Err(report.error.unwrap_or_else(|| "load failed".into()).into())
            }
        }
        Command::Embed { texts } => {
            let out = cli::embed(embedder(&args)?.as_ref(), texts).await?;
            emit(json, &out, &out)
        }
        Command::Rag {
            sources,
            k,
            chunk_size,
            chunk_overlap,
            question,
        } => {
            let answer = cli::rag(
                embedder(&args)?,
                llm(&args)?,
                sources,
                &question.join(" "),
                *k,
                (*chunk_size, *chunk_overlap),
            )
            .await?;
            emit(json, &answer, &answer.answer)
        }
        Command::Agent {
            thread_id,
            employees,
            checkpoint_db,
            query,
        } => {
            let opts = AgentOptions {
                employees: employees.clone(),
                thread_id: thread_id.clone(),
                checkpoint_db: checkpoint_db.clone().or_else(config::checkpoint_db_path),
            };
            let reply = cli::agent(llm(&args)?, embedder(&args)?, &query.join(" "), &opts).await?;
            emit(
                json,
                &serde_json::json!({ "thread_id": thread_id, "reply": reply }),
                &reply,
            )
        }
        Command::Probe { models, input } => {
            let outcomes = if args.offline {
                cli::probe(
                    |_| Ok::<_, BoxError>(Arc::new(MockLlm::echo()) as Arc<dyn LlmClient>),
                    models,
                    input,
                )
                .await
            } else {
                let settings = settings(&args)?;
                settings.require_api_key()?;
                let models = if models.is_empty() {
                    vec![settings.chat_model.clone()]
                } else {
                    models.clone()
                };
                cli::probe(
                    |name: &str| -> Result<Arc<dyn LlmClient>, BoxError> {
                        let settings = settings.clone().with_chat_model(name.to_string());
                        Ok(Arc::new(chat_client(&args, &settings)?))
                    },
                    &models,
                    input,
                )
                .await
            };
            let text = outcomes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            emit(json, &outcomes, text)
        }
        Command::Serve { addr } => {
            serve::run_serve(addr.as_deref(), llm(&args)?)
                .await
                .map_err(|e| -> BoxError { e })
        }
    }
}

#[tokio::main]
async fn main() {
    let applied = config::load_and_apply("weft", None::<&std::path::Path>);

    let args = Args::parse();
    let logging = if matches!(args.cmd, Command::Serve { .. }) {
        serve::init_logging();
        Ok(())
    } else {
        logging::init()
    };
    if let Err(e) = logging {
        eprintln!("weft: logging: {}", e);
    }
    match applied {
        Ok(keys) => tracing::debug!(?keys, "config applied"),
        Err(e) => tracing::warn!(error = %e, "config not loaded"),
    }

    if let Err(e) = run(args).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
