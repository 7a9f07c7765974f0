use std::fs::File;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use fieldtable::clipboard::SystemClipboard;
use fieldtable::controller::Controller;
use fieldtable::domain::{Message, TableConfig, TableError};
use fieldtable::loader::{expand_path, load_file};
use fieldtable::model::{Model, Status};
use fieldtable::ui::TableUI;
use fieldtable::wrapper::TableProps;

/// Browse column-oriented field data as a table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON field document, or a csv / parquet / arrow file
    path: String,

    /// Table caption, defaults to the title in the document or the file name
    #[arg(short, long)]
    title: Option<String>,

    /// Identifier shown on the status line
    #[arg(long)]
    id: Option<String>,

    /// Opaque class token shown on the status line
    #[arg(long = "class")]
    class_name: Option<String>,

    /// Event poll time in ms
    #[arg(long, default_value_t = 100)]
    poll: u64,

    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    #[arg(long, default_value = "fieldtable.log")]
    log_file: String,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    // The terminal loop blocks, so it runs on this thread with the runtime
    // entered; clipboard writes and timers run on the worker threads.
    let result = Runtime::new()
        .map_err(TableError::from)
        .and_then(|runtime| {
            let _guard = runtime.enter();
            run(args)
        });
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(config: &TableConfig) -> Result<(), TableError> {
    let file = File::create(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fieldtable={}", config.log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), TableError> {
    let config = TableConfig::default()
        .with_event_poll_time(args.poll)
        .with_max_column_width(args.max_column_width)
        .with_log_file(expand_path(&args.log_file)?)
        .with_log_level(args.log_level);
    init_tracing(&config)?;

    let loaded = load_file(expand_path(&args.path)?)?;
    let title = args
        .title
        .or(loaded.title)
        .unwrap_or_else(|| loaded.source.clone());
    let mut props = TableProps::default()
        .with_title(title)
        .with_id(args.id.or(loaded.id).unwrap_or(loaded.source))
        .with_fields(loaded.fields);
    props.class_name = args.class_name;
    info!("Starting fieldtable for \"{}\"", props.title);

    let clipboard = SystemClipboard::new()?;
    let mut model = Model::init(&config, props, Arc::new(clipboard));
    let ui = TableUI::new(&config);
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    model.update(Some(Message::Resize(size.width as usize, size.height as usize)))?;

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}
