//! Content reference linter.
//!
//! Sweeps a content root for embedded references that are malformed or do
//! not resolve, and lists what addresses exist for editor tooling:
//!
//! ```bash
//! lore-lint content/                      # validate every catalog
//! lore-lint content/ --list               # list domains
//! lore-lint content/ --list items weapons # list categories / references
//! ```

use lore_core::ContentResolver;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") || args.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    let root = args[0].clone();
    let resolver = ContentResolver::new(&root);

    if args.iter().any(|a| a == "--list") {
        let rest: Vec<&String> = args[1..].iter().filter(|a| *a != "--list").collect();
        run_list(&resolver, &rest);
        return ExitCode::SUCCESS;
    }

    match resolver.validate_root().await {
        Ok(diagnostics) if diagnostics.is_empty() => {
            println!("ok: every reference under {root} resolves");
            ExitCode::SUCCESS
        }
        Ok(diagnostics) => {
            for diagnostic in &diagnostics {
                println!("{diagnostic}");
            }
            println!("{} broken reference(s)", diagnostics.len());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: could not sweep {root}: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--list` with no extra args lists domains; with a domain it lists that
/// catalog's categories; with a domain and a category it lists addresses.
/// Path segments between domain and category are `/`-joined in the domain
/// argument, e.g. `items/weapons`.
fn run_list(resolver: &ContentResolver, args: &[&String]) {
    match args {
        [] => {
            for domain in resolver.available_domains() {
                println!("{domain}");
            }
        }
        [location] => {
            let (domain, path) = split_location(location);
            for category in resolver.available_categories(domain, &path) {
                println!("{category}");
            }
        }
        [location, category, ..] => {
            let (domain, path) = split_location(location);
            for reference in resolver.available_references(domain, &path, category) {
                println!("{reference}");
            }
        }
    }
}

/// Split `items/weapons/melee` into the domain and its path segments.
fn split_location(location: &str) -> (&str, Vec<String>) {
    let mut segments = location.split('/');
    let domain = segments.next().unwrap_or(location);
    (domain, segments.map(str::to_string).collect())
}

fn print_help() {
    println!("lore-lint - validate content reference integrity");
    println!();
    println!("USAGE:");
    println!("  lore-lint <ROOT> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help                Show this help message");
    println!("  --list [LOCATION [CAT]]   List domains, categories, or addresses");
    println!();
    println!("EXAMPLES:");
    println!("  lore-lint content/                       # sweep every catalog");
    println!("  lore-lint content/ --list                # domains");
    println!("  lore-lint content/ --list items/weapons  # categories");
    println!("  lore-lint content/ --list items/weapons swords");
    println!();
    println!("Exits non-zero when any reference is malformed or unresolvable.");
}
