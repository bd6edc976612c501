use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use viaroute::api::{Filter, FilterOrder, NodeId, Route, RouteLimits, SearchCfg};

mod graph;
mod provenance;

use provenance::Payload;

#[derive(Parser)]
#[command(name = "viaroute")]
#[command(about = "Constrained route queries over an edge list")]
struct Cmd {
    /// Optional run tag; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Cheapest route, optionally through waypoints
    Route {
        #[command(flatten)]
        query: Query,
    },
    /// Every route within cost and hop limits
    All {
        #[command(flatten)]
        query: Query,
        #[arg(long)]
        cost_max: Option<u64>,
        #[arg(long)]
        hop_max: Option<usize>,
    },
    /// Is `to` reachable from `from`?
    Reach {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Debug)]
struct Query {
    /// Edge list (.csv with from,to,cost or .json)
    #[arg(long)]
    graph: PathBuf,
    #[arg(long)]
    from: usize,
    #[arg(long)]
    to: usize,
    /// Waypoint: a node `n` or a required edge `u:v`; repeatable
    #[arg(long = "via", value_parser = parse_filter)]
    via: Vec<Filter>,
    /// Satisfy waypoints in the order given
    #[arg(long)]
    ordered: bool,
    /// Disable every search acceleration (for cross-checks)
    #[arg(long)]
    plain: bool,
    /// Write JSON here (plus a provenance sidecar) instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Query {
    fn order(&self) -> FilterOrder {
        if self.ordered {
            FilterOrder::Ordered
        } else {
            FilterOrder::Unordered
        }
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "graph": self.graph.display().to_string(),
            "from": self.from,
            "to": self.to,
            "via": self.via.iter().map(filter_label).collect::<Vec<_>>(),
            "ordered": self.ordered,
            "plain": self.plain,
        })
    }
}

#[derive(Debug, PartialEq, Serialize)]
struct RouteOut {
    cost: u64,
    hops: usize,
    nodes: Vec<usize>,
}

impl From<&Route> for RouteOut {
    fn from(r: &Route) -> Self {
        Self {
            cost: r.cost,
            hops: r.len(),
            nodes: r.nodes().into_iter().map(|n| n.0).collect(),
        }
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Route { query } => route(query, cmd.tag),
        Action::All {
            query,
            cost_max,
            hop_max,
        } => all(query, cost_max, hop_max, cmd.tag),
        Action::Reach { graph, from, to } => reach(&graph, from, to),
        Action::Report => report(cmd.tag),
    }
}

fn parse_filter(s: &str) -> std::result::Result<Filter, String> {
    let node = |t: &str| {
        t.trim()
            .parse::<usize>()
            .map(NodeId)
            .map_err(|e| format!("bad node `{t}`: {e}"))
    };
    match s.split_once(':') {
        Some((u, v)) => Ok(Filter::Edge(node(u)?, node(v)?)),
        None => Ok(Filter::Node(node(s)?)),
    }
}

fn filter_label(f: &Filter) -> String {
    match *f {
        Filter::Node(n) => n.0.to_string(),
        Filter::Edge(u, v) => format!("{}:{}", u.0, v.0),
    }
}

fn route(query: Query, tag: Option<String>) -> Result<()> {
    tracing::info!(params = %query.params(), tag = ?tag, "route");
    let mut engine = graph::load(&query.graph)?;
    if query.plain {
        engine.set_cfg(SearchCfg::plain());
    }
    let (s, e) = (NodeId(query.from), NodeId(query.to));
    let found = if query.via.is_empty() {
        engine.shortest_route(s, e)?
    } else {
        engine.shortest_route_with_waypoints(s, e, &query.via, query.order())?
    };
    let body = json!({ "route": found.as_ref().map(RouteOut::from) });
    emit(&body, query.out.as_deref(), Payload::new("route", query.params()).tagged(tag))
}

fn all(query: Query, cost_max: Option<u64>, hop_max: Option<usize>, tag: Option<String>) -> Result<()> {
    let defaults = RouteLimits::default();
    let limits = RouteLimits::new(
        cost_max.unwrap_or(defaults.cost_max),
        hop_max.unwrap_or(defaults.hop_max),
    );
    tracing::info!(params = %query.params(), ?cost_max, ?hop_max, tag = ?tag, "all");
    let mut engine = graph::load(&query.graph)?;
    if query.plain {
        engine.set_cfg(SearchCfg::plain());
    }
    let routes = engine.all_routes_with_waypoints(
        NodeId(query.from),
        NodeId(query.to),
        &query.via,
        query.order(),
        limits,
    )?;
    let body = json!({
        "count": routes.len(),
        "routes": routes.iter().map(RouteOut::from).collect::<Vec<_>>(),
    });
    let mut params = query.params();
    params["cost_max"] = json!(cost_max);
    params["hop_max"] = json!(hop_max);
    emit(&body, query.out.as_deref(), Payload::new("all", params).tagged(tag))
}

fn reach(path: &Path, from: usize, to: usize) -> Result<()> {
    tracing::info!(graph = %path.display(), from, to, "reach");
    let engine = graph::load(path)?;
    let reachable = engine.is_reachable(NodeId(from), NodeId(to))?;
    println!("{}", json!({ "from": from, "to": to, "reachable": reachable }));
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let doc = provenance::document(&Payload::new("report", json!({})).tagged(tag), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Pretty JSON to stdout, or to `out` with a provenance sidecar.
fn emit(body: &serde_json::Value, out: Option<&Path>, payload: Payload) -> Result<()> {
    let text = serde_json::to_string_pretty(body)?;
    let Some(out) = out else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    let sidecar = provenance::write_sidecar(out, &payload)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "written");
    Ok(())
}
