//! The DAG-aware rewriting pass.
//!
//! One pass visits every AND node present at entry, in creation order. For
//! each node it enumerates k-feasible cuts, prices an NPN-canonical
//! replacement template per cut against the node's maximum fanout-free cone,
//! and commits the best candidate when the net node gain is positive (or
//! zero, when zero-gain replacements are enabled). Nodes created by earlier
//! substitutions of the same pass are never revisited.
//!
//! The pass finishes by renumbering the arena depth-first and checking the
//! structural invariants; see [`PassStatus`] for the outcome encoding.

use std::time::Instant;

use log::{info, warn};

use crate::check;
use crate::cut::{Cut, CutIndex, CutParams};
use crate::edge::{Edge, NodeId};
use crate::level::{LevelMode, LevelTracker};
use crate::library::Library;
use crate::network::Network;
use crate::npn::Canon;
use crate::progress::{PassStats, Progress};
use crate::substitute::{self, Candidate, Substitution, SubstitutionError};

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Forbid substitutions that would deepen the network, and keep levels
    /// exact throughout the pass.
    pub update_level: bool,
    /// Accept the best candidate even when it frees exactly as many nodes as
    /// it adds. Useful to shake structure loose between passes.
    pub accept_zero_gain: bool,
    /// Nodes with more readers than this are not rewritten.
    pub fanout_cap: usize,
    pub cut: CutParams,
    /// Emit a progress line every this many visited nodes (0 = never).
    pub progress_interval: usize,
    /// Collect per-class scores into the pass statistics.
    pub detailed_stats: bool,
    /// Log the pass statistics at info level when the pass ends.
    pub verbose: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            update_level: true,
            accept_zero_gain: false,
            fanout_cap: 1000,
            cut: CutParams::default(),
            progress_interval: 0,
            detailed_stats: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PassStatus {
    /// The pass ran to completion and the network checks out.
    Completed,
    /// The pass ran to completion but the final integrity check failed.
    CheckFailed,
    /// Construction capacity ran out mid-pass. The network is consistent;
    /// the failed substitution was rolled back.
    Aborted,
}

impl PassStatus {
    /// The conventional return code: 1 completed, 0 check failed, -1 aborted.
    pub fn code(self) -> i32 {
        match self {
            PassStatus::Completed => 1,
            PassStatus::CheckFailed => 0,
            PassStatus::Aborted => -1,
        }
    }
}

#[derive(Debug)]
pub struct PassResult {
    pub status: PassStatus,
    pub stats: PassStats,
}

/// Hook into every committed substitution, e.g. for tracing or equivalence
/// recording.
pub trait RewriteObserver {
    fn on_substitution(&mut self, network: &Network, substitution: &Substitution);
}

struct NoopObserver;

impl RewriteObserver for NoopObserver {
    fn on_substitution(&mut self, _: &Network, _: &Substitution) {}
}

/// The best candidate found for a node: highest gain, shallower root on ties.
struct Best {
    gain: i64,
    root_level: u32,
    canon: Canon,
    leaves: [Edge; 4],
}

pub fn rewrite(network: &mut Network, options: &RewriteOptions) -> PassResult {
    rewrite_with_observer(network, options, &mut NoopObserver)
}

pub fn rewrite_with_observer(
    network: &mut Network,
    options: &RewriteOptions,
    observer: &mut dyn RewriteObserver,
) -> PassResult {
    let t_total = Instant::now();
    let mut stats = PassStats::default();
    if options.detailed_stats {
        stats.class_scores = Some(Default::default());
    }

    if !(2..=crate::cut::MAX_CUT_SIZE).contains(&options.cut.cut_size) || options.cut.max_cuts == 0
    {
        warn!(
            "rewriting not started: invalid cut parameters (size {}, cap {})",
            options.cut.cut_size, options.cut.max_cuts
        );
        return PassResult {
            status: PassStatus::CheckFailed,
            stats,
        };
    }

    // Dangling cones left over from earlier transformations would be priced
    // and rewritten for nothing.
    network.cleanup();
    stats.nodes_begin = network.num_ands();
    stats.levels_begin = network.max_level();

    let mode = if options.update_level {
        LevelMode::UpdateAware
    } else {
        LevelMode::Static
    };
    let tracker = LevelTracker::start(network, mode);
    let mut index = CutIndex::new(options.cut);
    let mut library = Library::new();
    let progress = Progress::new(options.progress_interval);

    // Nodes appended after this point were created by the pass itself.
    let bound = network.num_nodes() as NodeId;
    let mut status = PassStatus::Completed;

    for id in 0..bound {
        if !network.is_and(id) || network.is_dead(id) {
            continue;
        }
        stats.visited += 1;
        progress.tick(stats.visited, bound as usize);
        if network.is_persistent(id) {
            stats.skipped_persistent += 1;
            continue;
        }
        let readers = network.fanout_count(id);
        if readers == 0 {
            continue;
        }
        if readers > options.fanout_cap {
            stats.skipped_fanout += 1;
            continue;
        }

        let t = Instant::now();
        let cuts: Vec<Cut> = index.cuts_of(network, id).to_vec();
        stats.time_cuts += t.elapsed();

        let t = Instant::now();
        let mut best: Option<Best> = None;
        for cut in &cuts {
            if cut.len() < 2 {
                continue;
            }
            let freed = substitute::mffc(network, id, cut.leaves());
            let canon = library.canonize(cut.truth);
            let leaves = bind_leaves(cut, &canon);
            let candidate = Candidate {
                graph: library.graph_for(canon.tt),
                leaves,
                compl: canon.out_compl,
            };
            let Some(dry) = substitute::count_added(network, &candidate, id, &freed) else {
                continue;
            };
            if dry.root_level > tracker.allowed_level(network, id) {
                continue;
            }
            let gain = freed.len() as i64 - dry.added as i64;
            let better = best.as_ref().map_or(true, |b| {
                gain > b.gain || (gain == b.gain && dry.root_level < b.root_level)
            });
            if better {
                best = Some(Best {
                    gain,
                    root_level: dry.root_level,
                    canon,
                    leaves,
                });
            }
        }
        stats.time_match += t.elapsed();

        let Some(best) = best else { continue };
        if !(best.gain > 0 || (best.gain == 0 && options.accept_zero_gain)) {
            continue;
        }

        let t = Instant::now();
        let candidate = Candidate {
            graph: library.graph_for(best.canon.tt),
            leaves: best.leaves,
            compl: best.canon.out_compl,
        };
        let outcome = substitute::apply(network, &candidate, id);
        stats.time_update += t.elapsed();
        match outcome {
            Ok(sub) => {
                stats.accepted += 1;
                if best.gain == 0 {
                    stats.accepted_zero_gain += 1;
                }
                stats.gain_total += best.gain;
                stats.record_class(best.canon.tt, best.gain);
                tracker.repair(network, &sub.updated);
                let mut seeds: Vec<NodeId> = sub.updated.clone();
                seeds.extend_from_slice(&sub.added);
                seeds.extend_from_slice(&sub.deleted);
                seeds.push(sub.new_root.index());
                index.invalidate_up(network, &seeds);
                observer.on_substitution(network, &sub);
            }
            Err(SubstitutionError::SelfReference) => {
                stats.rejected_cycles += 1;
            }
            Err(SubstitutionError::ArenaFull(err)) => {
                warn!("rewriting aborted: {}", err);
                status = PassStatus::Aborted;
                break;
            }
        }
    }

    tracker.finish(network, status != PassStatus::Aborted);
    network.compact();
    if status == PassStatus::Completed {
        if let Err(err) = check::check(network) {
            warn!("network check failed after rewriting: {}", err);
            status = PassStatus::CheckFailed;
        }
    }

    stats.nodes_end = network.num_ands();
    stats.levels_end = network.max_level();
    stats.time_total = t_total.elapsed();
    if options.verbose {
        info!("{}", stats);
    }

    PassResult { status, stats }
}

/// Bind the template's canonical leaf slots to the cut's leaves, per the
/// inverse of the canonizing transform. Slots mapped past the cut's length
/// are vacuous in the template and get a placeholder.
fn bind_leaves(cut: &Cut, canon: &Canon) -> [Edge; 4] {
    let mut leaves = [Edge::one(); 4];
    for (i, slot) in canon.perm.iter().enumerate() {
        if (*slot as usize) < cut.len() {
            let flip = canon.flips >> i & 1 != 0;
            leaves[i] = Edge::new(cut.leaves()[*slot as usize], flip);
        }
    }
    leaves
}
