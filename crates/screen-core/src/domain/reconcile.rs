//! Scan reconciliation: bringing the store in line with a fresh output snapshot.
//!
//! Reconciliation runs in two steps so a scan either fully commits or leaves
//! the store untouched:
//!
//! 1. [`plan_scan`] reads the store and the grouped outputs and decides, for
//!    every group, whether it matches an existing screen, needs a new one, or
//!    whether an existing screen lost all its outputs.  Inconsistent input is
//!    rejected here, before anything changes.
//! 2. [`commit_plan`] applies the plan.  It cannot fail.
//!
//! A group matches an existing screen when both are made of exactly the same
//! set of output identifiers.  Matching keeps the screen's identity, so
//! scripts and windows holding it do not notice a resolution change beyond
//! the new geometry.  Script-managed screens are never matched, invalidated
//! or otherwise touched.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::geometry::Area;
use super::screen::{bounding_box, OutputDescriptor, OutputId, Screen, ScreenFlags, ScreenId};
use super::store::ScreenStore;

/// Reasons a snapshot cannot be reconciled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The same output was reported twice, so it would belong to two screens.
    #[error("output {0} appears in more than one group")]
    DuplicateOutput(OutputId),
}

/// An existing screen that survives the scan with (possibly) new outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct KeptScreen {
    pub id: ScreenId,
    pub outputs: Vec<OutputDescriptor>,
}

/// What a scan will do to the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPlan {
    pub keep: Vec<KeptScreen>,
    pub create: Vec<Vec<OutputDescriptor>>,
    pub invalidate: Vec<ScreenId>,
}

impl ScanPlan {
    /// Returns `true` if committing would add or remove screens.
    pub fn changes_screen_list(&self) -> bool {
        !self.create.is_empty() || !self.invalidate.is_empty()
    }
}

/// A kept screen whose geometry or outputs changed on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenUpdate {
    pub id: ScreenId,
    pub old_geometry: Area,
    pub new_geometry: Area,
    pub outputs_changed: bool,
}

impl ScreenUpdate {
    pub fn geometry_changed(&self) -> bool {
        self.old_geometry != self.new_geometry
    }
}

/// The store mutations a committed plan performed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitOutcome {
    pub added: Vec<ScreenId>,
    pub updated: Vec<ScreenUpdate>,
    pub removed: Vec<ScreenId>,
}

fn natively_managed(screen: &Screen) -> bool {
    !screen.is_fake() && !screen.flags().contains(ScreenFlags::MANAGED_BY_SCRIPT)
}

/// Plans the reconciliation of `store` with `groups` without mutating it.
///
/// # Errors
///
/// Returns [`PlanError::DuplicateOutput`] if an output identifier appears
/// in more than one place in `groups`.
pub fn plan_scan(
    store: &ScreenStore,
    groups: Vec<Vec<OutputDescriptor>>,
) -> Result<ScanPlan, PlanError> {
    let mut seen = HashSet::new();
    for output in groups.iter().flatten() {
        if !seen.insert(output.id) {
            return Err(PlanError::DuplicateOutput(output.id));
        }
    }

    let candidates: Vec<(ScreenId, Vec<OutputId>)> = store
        .iter()
        .filter(|s| natively_managed(s))
        .map(|s| (s.id(), s.output_ids()))
        .collect();
    let mut matched: HashSet<ScreenId> = HashSet::new();
    let mut plan = ScanPlan::default();

    for group in groups {
        let mut key: Vec<OutputId> = group.iter().map(|o| o.id).collect();
        key.sort_unstable();

        let existing = candidates
            .iter()
            .find(|(id, ids)| *ids == key && !matched.contains(id))
            .map(|(id, _)| *id);

        match existing {
            Some(id) => {
                matched.insert(id);
                plan.keep.push(KeptScreen { id, outputs: group });
            }
            None => plan.create.push(group),
        }
    }

    plan.invalidate = candidates
        .into_iter()
        .map(|(id, _)| id)
        .filter(|id| !matched.contains(id))
        .collect();

    debug!(
        keep = plan.keep.len(),
        create = plan.create.len(),
        invalidate = plan.invalidate.len(),
        "scan planned"
    );
    Ok(plan)
}

/// Applies a plan produced by [`plan_scan`] against the same store state.
///
/// Invalidated screens are unlinked and the native side releases them; they
/// stay pending until scripts and windows let go as well.
pub fn commit_plan(store: &mut ScreenStore, plan: ScanPlan) -> CommitOutcome {
    let mut outcome = CommitOutcome::default();

    for kept in plan.keep {
        let Ok(screen) = store.get_valid_mut(kept.id) else {
            continue;
        };
        let new_geometry = bounding_box(&kept.outputs);
        let outputs_changed = screen.outputs != kept.outputs;
        let old_geometry = screen.geometry;
        if outputs_changed || old_geometry != new_geometry {
            screen.outputs = kept.outputs;
            screen.geometry = new_geometry;
            outcome.updated.push(ScreenUpdate {
                id: kept.id,
                old_geometry,
                new_geometry,
                outputs_changed,
            });
        }
    }

    for id in plan.invalidate {
        if store.remove(id).is_ok() {
            // Known to exist: it was just unlinked into the pending queue.
            let _ = store.release_native(id);
            outcome.removed.push(id);
        }
    }

    for outputs in plan.create {
        let id = store.allocate_id();
        store.add(Screen::native(id, outputs));
        outcome.added.push(id);
    }

    outcome
}

// ── Tests ─────────────────────────────────────────────────────────────────────
