use study_scheduler::config::Config;
use study_scheduler::*;

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SAMPLE_DECK: &str = "Polish Vocabulary";
const SAMPLE_USER: &str = "demo";

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("study-scheduler.toml"));
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let store = SqliteStore::open(&config.database_path)?;

    if store.list_decks()?.is_empty() {
        store.new_deck(SAMPLE_DECK)?;

        store.add_card(SAMPLE_DECK, "cześć", "hello")?;
        store.add_card(SAMPLE_DECK, "dziękuję", "thank you")?;
        store.add_card(SAMPLE_DECK, "proszę", "please")?;
        store.add_card(SAMPLE_DECK, "przepraszam", "sorry")?;
        store.add_card(SAMPLE_DECK, "do widzenia", "goodbye")?;

        tracing::info!(deck = SAMPLE_DECK, "sample data created");
    }

    let scheduler = Scheduler::new(store, SystemClock);

    for name in scheduler.store().list_decks()? {
        let deck = scheduler.load_deck(&name)?;
        let session = scheduler.get_due_items(&deck, SAMPLE_USER, config.session_size)?;
        println!("{} ({} cards): {} to study", deck.name, deck.cards.len(), session.len());

        // Every third card is answered wrong so the demo exercises both paths.
        for (i, due) in session.iter().enumerate() {
            let correct = i % 3 != 2;
            let state = scheduler.record_attempt(&deck, SAMPLE_USER, due.card.id, correct, None)?;
            println!(
                "  {:<14} {:<10} mastery {:>3}  next review in {} day(s)",
                due.card.term,
                if correct { "correct" } else { "incorrect" },
                state.mastery_level,
                state.interval_days
            );
        }

        let stats = scheduler.get_set_statistics(&deck, SAMPLE_USER)?;
        println!(
            "  studied {}/{}, mastered {}, due {}, average mastery {:.1}, success rate {:.0}%",
            stats.studied_cards,
            stats.total_cards,
            stats.mastered_cards,
            stats.due_for_review,
            stats.average_mastery,
            stats.success_rate * 100.0
        );

        if let Some(dir) = &config.progress_export_dir {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(format!("{}-{}.json", SAMPLE_USER, deck.name.replace(' ', "_")));
            let exported = scheduler.export_progress_to_path(&deck, SAMPLE_USER, &path)?;
            println!("  exported {} card(s) to {}", exported, path.display());
        }
    }

    Ok(())
}
