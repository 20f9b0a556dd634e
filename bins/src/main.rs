use std::sync::Arc;

use chrono::Local;
use eyre::Context;
use ledger::{view::CalendarView, Ledger};
use log::info;
use model::ids::{DayRange, WeekId};
use storage::MemoryStore;

mod render;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let env = env::Env::load().context("Failed to load env")?;
    pretty_env_logger::formatted_builder()
        .parse_filters(env.rust_log())
        .init();
    color_eyre::install()?;

    info!("loading fixture {}", env.fixture().display());
    let store = MemoryStore::load(env.fixture()).context("Failed to create storage")?;
    info!("creating ledger");
    let ledger = Ledger::new(Arc::new(store));

    let viewer = env.viewer();
    let week = WeekId::new(Local::now());
    let range = DayRange::days(week.first_day(), env.calendar_days());
    let sources = ledger.load(range, &viewer).await?;
    let view = CalendarView::mount(viewer, week, env.calendar_days(), sources.coaches());
    info!(
        "Viewer {} ({}), days {} .. {}",
        view.viewer().id,
        view.viewer().role,
        view.range().from,
        view.range().to
    );

    let types: Vec<&str> = view.filter().enabled_types().map(|t| t.label()).collect();
    info!("Showing: {}", types.join(", "));

    let sessions = ledger.calendar(&view).await?;
    println!("{}", render::grid(&sessions, view.range()));
    print!("{}", render::list(&sessions, view.viewer(), Local::now()));
    Ok(())
}
