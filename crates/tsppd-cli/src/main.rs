// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use tsppd_model::prelude::InstanceLoader;
use tsppd_solver::bc::params::BranchAndCutParams;
use tsppd_solver::bc::solver::BranchAndCutSolver;
use tsppd_solver::bc::stats::FamilyReport;
use tsppd_solver::heuristics::best_insertion::BestInsertionHeuristic;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[derive(Serialize)]
struct RunRecord {
    filename: String,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
    runtime_ms: u128,
    status: String,
    cost: Option<f64>,
    tour: Option<Vec<usize>>,
    warm_start_cost: Option<f64>,
    root_cut_rounds: u64,
    lazy_rounds: u64,
    total_cuts: u64,
    cuts: std::collections::BTreeMap<String, FamilyReport>,
}

fn load_params() -> BranchAndCutParams {
    match std::env::var("TSPPD_PARAMS") {
        Ok(path) => match File::open(&path) {
            Ok(file) => match serde_json::from_reader(file) {
                Ok(params) => {
                    tracing::info!("loaded branch-and-cut parameters from {path}");
                    params
                }
                Err(e) => {
                    tracing::error!("ignoring unparsable parameter file {path}: {e}");
                    BranchAndCutParams::default()
                }
            },
            Err(e) => {
                tracing::error!("ignoring unreadable parameter file {path}: {e}");
                BranchAndCutParams::default()
            }
        },
        Err(_) => BranchAndCutParams::default(),
    }
}

fn main() {
    enable_tracing();

    let instances: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if instances.is_empty() {
        eprintln!("usage: tsppd <instance> [<instance> ...]");
        std::process::exit(2);
    }

    let params = load_params();
    let loader = InstanceLoader::new();
    let mut results: Vec<RunRecord> = Vec::new();

    for path in instances {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        let graph = match loader.from_path(&path) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::error!("skipping {}: {e}", path.display());
                continue;
            }
        };

        tracing::info!(
            "solving {} with {} requests, capacity {}",
            filename,
            graph.n(),
            graph.capacity()
        );

        let start_ts = Utc::now();
        let t0 = Instant::now();

        let warm_start = match BestInsertionHeuristic::new(&graph).solve() {
            Ok(tour) => {
                tracing::info!(cost = tour.cost(&graph), "warm start: {tour}");
                Some(tour)
            }
            Err(e) => {
                tracing::warn!("no warm start: {e}");
                None
            }
        };

        let mut solver = BranchAndCutSolver::new(&graph, params.clone());
        if let Some(tour) = &warm_start {
            solver = solver.with_reference_tour(tour);
        }

        let outcome = match solver.solve() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("solve failed on {}: {e}", filename);
                continue;
            }
        };

        let runtime = t0.elapsed();
        let end_ts = Utc::now();

        match (&outcome.tour, outcome.cost) {
            (Some(tour), Some(cost)) => {
                tracing::info!(
                    "finished {}: status={}, cost={}, runtime={:?}, tour={}",
                    filename,
                    outcome.status,
                    cost,
                    runtime,
                    tour
                );
            }
            _ => {
                tracing::warn!(
                    "finished {}: status={}, runtime={:?}",
                    filename,
                    outcome.status,
                    runtime
                );
            }
        }

        results.push(RunRecord {
            filename,
            start_ts,
            end_ts,
            runtime_ms: runtime.as_millis(),
            status: outcome.status.to_string(),
            cost: outcome.cost,
            tour: outcome.tour.map(|t| t.into_nodes()),
            warm_start_cost: warm_start.as_ref().map(|t| t.cost(&graph)),
            root_cut_rounds: outcome.root_cut_rounds,
            lazy_rounds: outcome.lazy_rounds,
            total_cuts: outcome.total_cuts,
            cuts: outcome.cut_report,
        });
    }

    let out_path = PathBuf::from("tsppd_results.json");
    match File::create(&out_path).and_then(|mut f| {
        let json = serde_json::to_string_pretty(&results).expect("serialize results");
        f.write_all(json.as_bytes())
    }) {
        Ok(()) => {
            tracing::info!(
                "wrote {} run record(s) to {}",
                results.len(),
                out_path.display()
            );
        }
        Err(e) => {
            tracing::error!("failed to write results to {}: {e}", out_path.display());
        }
    }
}
