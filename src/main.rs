use std::time::Duration;

use inkroute::config::EssayServiceConfig;
use inkroute::engine::PageEngine;
use inkroute::router::Route;
use inkroute::store::SiteStore;

/// Load one static page end to end and print what the engine committed.
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(base_url), Some(path)) = (args.next(), args.next()) else {
        eprintln!("usage: inkroute <base-url> <route-path>");
        eprintln!("  e.g. inkroute https://example.com /about");
        std::process::exit(2);
    };

    let store = SiteStore::new(base_url);
    let mut engine = PageEngine::new(store, EssayServiceConfig::from_env());
    engine.load_static_page(Route::new(path));

    loop {
        match engine.check_fetch() {
            Ok(true) => break,
            Ok(false) => std::thread::sleep(Duration::from_millis(50)),
            Err(e) => {
                eprintln!("load failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("title:  {}", engine.store().title());
    println!("banner: {}", engine.store().banner());
    println!("links:  {}", engine.nav_bindings().len());
    println!("{}", engine.store().html());
}
