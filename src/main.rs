use std::path::Path;

use anyhow::Result;

mod app;
mod conversation;
mod handler;
mod responder;
mod storage;
mod store;
mod tui;
mod ui;

use app::App;
use storage::Storage;

/// Logs go to a file; the terminal UI owns stderr.
fn init_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let log_file = std::fs::File::create(dir.join("causerie.log"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let storage_dir = Storage::default_dir()?;
    init_logging(&storage_dir)?;

    let storage = Storage::new(storage_dir);
    let mut app = App::new(storage);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
