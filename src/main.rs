use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;
use std::env;
use std::path::Path;

use reading_stats::config::db_path_from_env;
use reading_stats::{
    get_all_entries, insert_entries, load_entries, parse_date, setup_database, verify_count,
    EngineConfig, LibraryEntry, MonthKey, MonthlyBreakdown, StatsEngine, TrailingWindow,
    ViewParams,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("report");
    let rest: &[String] = args.get(2..).unwrap_or(&[]);

    match command {
        "import" => run_import(rest),
        "report" => run_report(rest),
        "calendar" => run_calendar(rest),
        "day" => run_day(rest),
        "breakdown" => run_breakdown(rest),
        other => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: reading-stats [import <file> | report [6|12|all] [--json] | calendar <YYYY-MM> | day <YYYY-MM-DD> | breakdown [6|12|all] [YYYY-MM]]");
            std::process::exit(2);
        }
    }
}

fn open_store() -> Result<Connection> {
    let db_path = db_path_from_env();
    let conn = Connection::open(&db_path).with_context(|| format!("Failed to open {}", db_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn load_snapshot() -> Result<(StatsEngine, Vec<LibraryEntry>)> {
    let engine = StatsEngine::with_config(EngineConfig::from_env()?);
    let conn = open_store()?;
    let entries = get_all_entries(&conn)?;
    Ok((engine, entries))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn window_arg(args: &[String], engine: &StatsEngine) -> Result<TrailingWindow> {
    match args.iter().find(|a| !a.starts_with("--") && a.parse::<TrailingWindow>().is_ok()) {
        Some(raw) => raw.parse(),
        None => Ok(engine.config.default_window),
    }
}

fn run_import(args: &[String]) -> Result<()> {
    println!("📥 Import - library file → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = args.first().context("Usage: reading-stats import <file.csv|file.json>")?;

    println!("\n📂 Loading {}...", path);
    let entries = load_entries(Path::new(path))?;
    println!("✓ Loaded {} entries", entries.len());

    println!("\n💾 Storing entries...");
    let conn = open_store()?;
    insert_entries(&conn, &entries)?;

    let count = verify_count(&conn)?;
    println!("✓ Store contains {} entries", count);

    Ok(())
}

fn run_report(args: &[String]) -> Result<()> {
    let (engine, entries) = load_snapshot()?;
    let window = window_arg(args, &engine)?;
    let report = engine.compute(&entries, &ViewParams::new(today(), window));

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📊 Reading Statistics ({} books)", report.overview.total_entries);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📚 Status");
    for (status, count) in report.overview.status_counts.non_zero() {
        println!("   {:<14} {}", status.label(), count);
    }
    println!("   Average rating: {}", report.overview.average_rating);
    println!("   Finished this month: {}", report.overview.finished_this_month);

    println!("\n📈 Finished per month (last {})", window);
    for point in &report.habits.monthly {
        println!("   {:<9} {:>3} {}", point.label, point.count, "█".repeat(point.count));
    }

    println!("\n⏱️  Reading speed");
    println!("   Average: {} days", report.habits.speed.average_days);
    if let Some(fastest) = report.habits.speed.fastest {
        println!("   Fastest: {} ({} days)", fastest.entry.title, fastest.days);
    }
    if let Some(slowest) = report.habits.speed.slowest {
        println!("   Slowest: {} ({} days)", slowest.entry.title, slowest.days);
    }

    let limit = engine.config.category_display_limit;
    println!("\n🏷️  Genres");
    for genre in report.genres.categories.iter().take(limit) {
        println!("   {:<24} {}", genre.name, genre.count);
    }
    println!("\n✍️  Authors");
    for author in &report.genres.authors {
        println!("   {:<24} {}", author.name, author.count);
    }

    println!("\n🔖 Wishlist genres");
    for genre in report.wishlist.categories.iter().take(limit) {
        println!("   {:<24} {}", genre.name, genre.count);
    }

    Ok(())
}

fn run_calendar(args: &[String]) -> Result<()> {
    let (engine, entries) = load_snapshot()?;
    let month = match args.first() {
        Some(raw) => raw.parse::<MonthKey>()?,
        None => MonthKey::of(today()),
    };

    let view = engine.calendar(&entries, month);
    println!("📅 {} ({} finished)", view.label, view.finished_in_month());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for week in view.weeks() {
        let line: Vec<String> = week
            .iter()
            .map(|day| {
                let marker = match (day.in_month, day.count) {
                    (false, _) => "  ".to_string(),
                    (true, 0) => " .".to_string(),
                    (true, n) => format!("{:>2}", n),
                };
                format!("{}:{}", day.date.day(), marker)
            })
            .collect();
        println!("   {}", line.join("  "));
    }

    for day in view.days.iter().filter(|d| d.is_selectable()) {
        if let Some(rep) = day.representative {
            if day.more_count() > 0 {
                println!("   {} {} + {} more", day.date, rep.title, day.more_count());
            } else {
                println!("   {} {}", day.date, rep.title);
            }
        }
    }

    Ok(())
}

fn run_day(args: &[String]) -> Result<()> {
    let (engine, entries) = load_snapshot()?;
    let raw = args.first().context("Usage: reading-stats day <YYYY-MM-DD>")?;
    let date = parse_date(raw).with_context(|| format!("Invalid date: {}", raw))?;

    let view = engine.calendar(&entries, MonthKey::of(date));
    match view.select_day(date) {
        Some(detail) => {
            println!("📖 Finished on {}", detail.date);
            for entry in detail.entries {
                println!("   {} - {}", entry.title, entry.display_author());
            }
        }
        None => println!("Nothing finished on {}", date),
    }

    Ok(())
}

fn run_breakdown(args: &[String]) -> Result<()> {
    let (engine, entries) = load_snapshot()?;
    let window = window_arg(args, &engine)?;

    let mut selection = MonthlyBreakdown::new();
    if let Some(month) = args.iter().find_map(|a| a.parse::<MonthKey>().ok()) {
        selection.select(month);
    }

    let listed = engine.breakdown(&entries, window, &mut selection);
    match selection.selected() {
        Some(month) => {
            println!("🗓️  {} ({} books)", month.label(), listed.len());
            for entry in listed {
                let end = entry
                    .review
                    .as_ref()
                    .and_then(|r| r.end_date.as_deref())
                    .unwrap_or("");
                println!("   {}  {} - {}", end, entry.title, entry.display_author());
            }
        }
        None => println!("No finished books yet"),
    }

    Ok(())
}
