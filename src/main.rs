use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prioicon::runtime::lock;
use prioicon::{render_stylesheet, Config, Document, Engine, Page, PageRuntime};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: PRIOICON_CONFIG, PRIOICON_SCAN_ROOTS, PRIOICON_CSS_OUT");
            eprintln!("Optional: PRIOICON_MUTATION_DEBOUNCE_MS, PRIOICON_NAVIGATION_DEBOUNCE_MS");
            std::process::exit(1);
        }
    };

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("Usage: prioicon <page.html>");
        std::process::exit(2);
    };

    let html = match std::fs::read_to_string(&input) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input, e);
            std::process::exit(1);
        }
    };

    // Resolve priorities
    let priorities = config.load_priorities();
    tracing::info!("Loaded {} priority names", priorities.len());

    if let Some(css_out) = &config.css_out {
        if let Err(e) = std::fs::write(css_out, render_stylesheet(&priorities)) {
            eprintln!("Failed to write {}: {}", css_out.display(), e);
            std::process::exit(1);
        }
        tracing::info!("Stylesheet written to {}", css_out.display());
    }

    // Open the page and run it through ready
    let engine = Engine::new(priorities, config.scan_roots.clone());
    let (page, events) = Page::new(Document::parse_html(&html));
    let runtime = PageRuntime::new(engine, &page, config.delays);
    let handle = tokio::spawn(runtime.run(events));

    page.ready();
    let document = page.document();
    // Closing the page ends the runtime once the ready pass is done
    drop(page);

    match handle.await {
        Ok(stats) => {
            tracing::info!(
                "Replaced {} priority labels in {} passes",
                stats.replaced,
                stats.passes
            );
            match serde_json::to_string(&stats) {
                Ok(json) => tracing::debug!("Runtime stats: {}", json),
                Err(e) => tracing::warn!("Failed to encode runtime stats: {}", e),
            }
        }
        Err(e) => {
            eprintln!("Page runtime failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("{}", lock(&document).to_html());
}
