//! Edge-list loading for the driver.
//!
//! Two formats, picked by extension:
//! - `.csv` with header `from,to,cost`, read through a polars lazy frame;
//! - `.json` as `{"nodes": n, "edges": [[from, to, cost], ...]}`, `nodes` optional.
//!
//! The node count is the larger of `nodes` and one past the highest index seen.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use viaroute::api::{NodeId, RouteEngine};

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct EdgeList {
    #[serde(default)]
    pub nodes: Option<usize>,
    pub edges: Vec<(usize, usize, u32)>,
}

impl EdgeList {
    pub fn node_count(&self) -> usize {
        let seen = self
            .edges
            .iter()
            .map(|&(u, v, _)| u.max(v) + 1)
            .max()
            .unwrap_or(0);
        self.nodes.unwrap_or(0).max(seen)
    }

    pub fn into_engine(self) -> Result<RouteEngine> {
        let mut adjacency = vec![Vec::new(); self.node_count()];
        for (u, v, cost) in self.edges {
            adjacency[u].push((NodeId(v), cost));
        }
        Ok(RouteEngine::from_adjacency(&adjacency)?)
    }
}

pub fn load(path: &Path) -> Result<RouteEngine> {
    let list = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_csv(path),
        Some("json") => read_json(path),
        _ => bail!("unsupported graph format: {}", path.display()),
    }
    .with_context(|| format!("loading graph {}", path.display()))?;
    tracing::info!(
        nodes = list.node_count(),
        edges = list.edges.len(),
        "graph_loaded"
    );
    list.into_engine()
}

fn read_json(path: &Path) -> Result<EdgeList> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn read_csv(path: &Path) -> Result<EdgeList> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()?
        .select([
            col("from").cast(DataType::UInt64),
            col("to").cast(DataType::UInt64),
            col("cost").cast(DataType::UInt32),
        ])
        .collect()?;
    let from = df.column("from")?.u64()?;
    let to = df.column("to")?.u64()?;
    let cost = df.column("cost")?.u32()?;

    let mut edges = Vec::with_capacity(df.height());
    for (row, ((u, v), c)) in from.into_iter().zip(to).zip(cost).enumerate() {
        let (Some(u), Some(v), Some(c)) = (u, v, c) else {
            bail!("row {row}: missing or non-integer field");
        };
        edges.push((usize::try_from(u)?, usize::try_from(v)?, c));
    }
    Ok(EdgeList { nodes: None, edges })
}
