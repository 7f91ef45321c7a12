// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notehub::app::render::{render_form, render_snapshot};
use notehub::{
    AppConfig, AppError, CommandLineInput, FormField, Note, NoteForm, NoteHttpClient, NoteId,
    NoteRepository, NotesApp, QueryCache,
};
use std::fs;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Commands:
  /s <text>   type into the search box (applied after a short pause)
  /f          apply the search now
  /p <n>      go to page n
  /n, /b      next / previous page
  /new        create a note
  /d <id>     delete a note
  /r          reload the current page
  /h          show this help
  /q          quit";

/// Sets up logging configuration. Console output goes to stderr so it does
/// not interleave with the rendered list on stdout.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notehub.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(console_appender)),
        )
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// The create-note modal while it is open: the form and the input being prompted.
struct Composer {
    form: NoteForm,
    step: usize,
}

impl Composer {
    fn new() -> Self {
        Self {
            form: NoteForm::new(),
            step: 0,
        }
    }

    fn current_field(&self) -> Option<FormField> {
        FormField::ALL.get(self.step).copied()
    }

    fn prompt(&self) {
        if let Some(field) = self.current_field() {
            println!("{} [{}]:", field, self.form.value(field));
        }
    }

    /// Goes back to the first input with a message, or the first input.
    fn rewind(&mut self) {
        self.step = FormField::ALL
            .iter()
            .position(|field| self.form.error(*field).is_some())
            .unwrap_or(0);
    }
}

enum Flow {
    Continue,
    Quit,
}

/// A mutation that finished in the background.
enum Finished {
    Created(Result<Note, AppError>),
    Deleted(NoteId, Result<Note, AppError>),
}

fn print_frame(app: &NotesApp, composer: Option<&Composer>) {
    println!(
        "{}",
        render_snapshot(&app.snapshot(), composer.map(|c| &c.form))
    );
}

/// Feeds one input line to the open form. Returns false once the modal is closed.
fn handle_compose_line(
    app: &Arc<NotesApp>,
    composer: &mut Composer,
    line: &str,
    finished: &mpsc::UnboundedSender<Finished>,
) -> bool {
    if composer.form.is_submitting() {
        println!("{}", composer.form.submit_label());
        return true;
    }
    if line == "/cancel" {
        app.close_create_modal();
        return false;
    }

    if let Some(field) = composer.current_field() {
        if !line.is_empty() {
            composer.form.set(field, line);
        }
        composer.step += 1;
    }
    if composer.current_field().is_some() {
        composer.prompt();
        return true;
    }

    match composer.form.begin_submit() {
        Ok(note) => {
            print!("{}", render_form(&composer.form));
            let app = Arc::clone(app);
            let finished = finished.clone();
            tokio::spawn(async move {
                let result = app.create_note(&note).await;
                let _ = finished.send(Finished::Created(result));
            });
        }
        Err(AppError::Form(_)) => {
            print!("{}", render_form(&composer.form));
            composer.rewind();
            composer.prompt();
        }
        Err(e) => println!("Could not create note: {}", e.display_message()),
    }
    true
}

/// Applies a finished create to the open form.
fn finish_create(app: &NotesApp, composer: &mut Option<Composer>, result: Result<Note, AppError>) {
    let Some(active) = composer.as_mut() else {
        return;
    };
    active.form.finish_submit(&result);
    match result {
        Ok(note) => {
            println!("Created \"{}\" ({})", note.title, note.id);
            *composer = None;
            print_frame(app, None);
        }
        Err(e) => {
            println!("Could not create note: {}", e.display_message());
            active.rewind();
            active.prompt();
        }
    }
}

fn handle_command(
    app: &Arc<NotesApp>,
    composer: &mut Option<Composer>,
    line: &str,
    finished: &mpsc::UnboundedSender<Finished>,
) -> Flow {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "/q" | "/quit" => return Flow::Quit,
        "/s" => app.type_search(arg),
        "/f" => app.flush_search(),
        "/p" => match arg.parse::<u32>() {
            Ok(page) => app.go_to_page(page),
            Err(_) => println!("Usage: /p <page number>"),
        },
        "/n" | "/b" => {
            let pagination = app.snapshot().pagination;
            let change = pagination.and_then(|p| if command == "/n" { p.next() } else { p.previous() });
            match change {
                Some(change) => app.change_page(change),
                None => println!("No such page"),
            }
        }
        "/new" => {
            app.open_create_modal();
            let fresh = Composer::new();
            fresh.prompt();
            *composer = Some(fresh);
        }
        "/d" if !arg.is_empty() => {
            let app = Arc::clone(app);
            let finished = finished.clone();
            let id = NoteId::new(arg);
            tokio::spawn(async move {
                let result = app.delete_note(&id).await;
                let _ = finished.send(Finished::Deleted(id, result));
            });
        }
        "/r" => {
            app.refresh();
        }
        _ => println!("{}", HELP),
    }
    Flow::Continue
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let client = NoteHttpClient::new(&config.client).context("failed to build HTTP client")?;
    let repository: Arc<dyn NoteRepository> = Arc::new(client);
    let cache = QueryCache::new(config.cache);
    let app = Arc::new(NotesApp::new(repository, &cache, config.shell_config()));

    let (redraw_tx, mut redraw_rx) = mpsc::unbounded_channel::<()>();
    let _subscription = app.subscribe(move |_| {
        let _ = redraw_tx.send(());
    });
    let (finished_tx, mut finished_rx) = mpsc::unbounded_channel::<Finished>();

    println!("{}", HELP);
    print_frame(&app, None);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut composer: Option<Composer> = None;

    loop {
        tokio::select! {
            Some(()) = redraw_rx.recv() => {
                while redraw_rx.try_recv().is_ok() {}
                if composer.is_none() {
                    print_frame(&app, None);
                }
            }
            Some(done) = finished_rx.recv() => match done {
                Finished::Created(result) => finish_create(&app, &mut composer, result),
                Finished::Deleted(id, Err(e)) => {
                    println!("Could not delete note {}: {}", id, e.display_message());
                }
                Finished::Deleted(..) => {}
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let line = line.trim();

                if let Some(active) = composer.as_mut() {
                    if !handle_compose_line(&app, active, line, &finished_tx) {
                        composer = None;
                        print_frame(&app, None);
                    }
                    continue;
                }

                if let Flow::Quit = handle_command(&app, &mut composer, line, &finished_tx) {
                    break;
                }
            }
        }
    }

    log::debug!("Shutting down");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("failed to set up logging: {}", e))?;

    let config = AppConfig::resolve(cli)?;

    run(config).await
}
