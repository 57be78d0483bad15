//! Node listing subcommands.

use anyhow::Result;
use clap::Args;

use volant_api::models::VpnNode;

use crate::context;

/// Arguments for `volant nodes`.
#[derive(Debug, Args)]
pub struct NodesArgs {
    /// Filter by country
    #[arg(long)]
    pub country: Option<String>,

    /// Show only the backend's recommended node
    #[arg(long)]
    pub best: bool,
}

fn print_node(node: &VpnNode) {
    let location = if node.city.is_empty() {
        node.country.clone()
    } else {
        format!("{}, {}", node.city, node.country)
    };
    println!(
        "{:<24} {:<28} load {:>5.1}%  {:>4} ms  {}/{} clients",
        node.id,
        format!("{} ({location})", node.name),
        node.load_score,
        node.latency,
        node.current_connections,
        node.max_connections,
    );
}

/// List available nodes.
pub fn run(args: &NodesArgs, api_url: Option<&str>) -> Result<()> {
    let (client, _store, _session) = context::authenticated(api_url)?;

    if args.best {
        let node = client.best_node()?;
        print_node(&node);
        return Ok(());
    }

    let nodes = client.nodes(args.country.as_deref(), Some("wireguard"))?;
    if nodes.is_empty() {
        println!("no nodes available");
        return Ok(());
    }
    for node in &nodes {
        print_node(node);
    }
    Ok(())
}
