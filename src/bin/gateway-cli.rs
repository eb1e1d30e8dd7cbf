use std::path::PathBuf;

use clap::{Parser, Subcommand};

use simple_gateway::config::{Requirements, RouteDocument, RouteSpec, TargetSpec};
use simple_gateway::routing::Target;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Edit the route document of the Simple Gateway", long_about = None)]
struct Cli {
    /// Route document to edit
    #[arg(short, long, env = "SERVICE_ROUTES_FILE", default_value = "routes.json")]
    routes: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or replace a route
    Add {
        /// First path segment that selects the route
        id: String,
        /// Upstream URL, e.g. https://api.example.com/v1
        target: String,
        /// Explicit OpenAPI document URL
        #[arg(long)]
        open_api: Option<String>,
        /// Require an Authorization header
        #[arg(long)]
        authorization: bool,
        /// Require a Cookie header
        #[arg(long)]
        cookie: bool,
        /// Require an X-API-KEY header
        #[arg(long)]
        api_key: bool,
    },
    /// Print the route document
    List,
    /// Remove a route
    Remove {
        id: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut document = RouteDocument::load(&cli.routes)?;

    match cli.command {
        Commands::Add { id, target, open_api, authorization, cookie, api_key } => {
            let id = id.to_lowercase();
            if id.is_empty() || id.contains('/') {
                return Err(format!("invalid route id {id:?}").into());
            }
            Target::parse(&target).map_err(|e| format!("invalid target {target}: {e}"))?;

            let spec = RouteSpec {
                target: Some(TargetSpec::Url(target)),
                require: Requirements { authorization, cookie, api_key },
                open_api,
            };
            let replaced = remove_route(&mut document, &id);
            document.routes.insert(id.clone(), spec);
            document.save(&cli.routes)?;

            let verb = if replaced { "Updated" } else { "Added" };
            println!("{verb} route {id} in {}", cli.routes.display());
        }
        Commands::List => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Remove { id } => {
            let id = id.to_lowercase();
            if !remove_route(&mut document, &id) {
                eprintln!("Error: no route {id} in {}", cli.routes.display());
                std::process::exit(1);
            }
            document.save(&cli.routes)?;
            println!("Removed route {id} from {}", cli.routes.display());
        }
    }

    Ok(())
}

/// Remove every entry whose id matches `id` ignoring case.
fn remove_route(document: &mut RouteDocument, id: &str) -> bool {
    let before = document.routes.len();
    document.routes.retain(|key, _| !key.eq_ignore_ascii_case(id));
    document.routes.len() != before
}
