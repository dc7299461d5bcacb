//! Output grouping: deciding which physical outputs form one logical screen.
//!
//! What makes several outputs "one screen" depends on the environment.  Two
//! monitors in cloned mode show the same picture at the same position and
//! must become a single screen; a tiled 5K panel driven over two connectors
//! is reported by RandR 1.5 as one *monitor* spanning two outputs.  Everything
//! else is one screen per output.
//!
//! The rule is therefore a pluggable [`MergePolicy`]: a symmetric predicate
//! saying whether two outputs belong together.  [`group_outputs`] takes the
//! transitive closure of that predicate, so if A merges with B and B with C,
//! all three land in one group even when A and C would not merge directly.

use super::screen::OutputDescriptor;

/// Decides whether two connected outputs belong to the same logical screen.
pub trait MergePolicy: Send + Sync {
    /// Returns `true` if `a` and `b` should be merged.
    fn should_merge(&self, a: &OutputDescriptor, b: &OutputDescriptor) -> bool;

    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;
}

/// Merges outputs with exactly the same geometry (cloned outputs).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalGeometry;

impl MergePolicy for IdenticalGeometry {
    fn should_merge(&self, a: &OutputDescriptor, b: &OutputDescriptor) -> bool {
        a.geometry == b.geometry
    }

    fn name(&self) -> &'static str {
        "identical-geometry"
    }
}

/// Merges outputs the windowing system reports as one unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeUnits;

impl MergePolicy for NativeUnits {
    fn should_merge(&self, a: &OutputDescriptor, b: &OutputDescriptor) -> bool {
        matches!((a.unit, b.unit), (Some(ua), Some(ub)) if ua == ub)
    }

    fn name(&self) -> &'static str {
        "native-units"
    }
}

/// Every output is its own screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverMerge;

impl MergePolicy for NeverMerge {
    fn should_merge(&self, _a: &OutputDescriptor, _b: &OutputDescriptor) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "never"
    }
}

/// Native grouping hints first, identical geometry otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMergePolicy;

impl MergePolicy for DefaultMergePolicy {
    fn should_merge(&self, a: &OutputDescriptor, b: &OutputDescriptor) -> bool {
        NativeUnits.should_merge(a, b) || IdenticalGeometry.should_merge(a, b)
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

/// Splits outputs into groups under `policy`.
///
/// Disconnected outputs and outputs without a mode (empty geometry) are
/// skipped.  Groups appear in the order of their first output, and outputs
/// keep their enumeration order inside a group.
pub fn group_outputs(
    outputs: &[OutputDescriptor],
    policy: &dyn MergePolicy,
) -> Vec<Vec<OutputDescriptor>> {
    let active: Vec<&OutputDescriptor> = outputs
        .iter()
        .filter(|o| o.connected && !o.geometry.is_empty())
        .collect();

    // Union-find over the active outputs.
    let mut parent: Vec<usize> = (0..active.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            if policy.should_merge(active[i], active[j]) {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    // Keep the earliest output as root so group order is stable.
                    let (root, child) = if ri < rj { (ri, rj) } else { (rj, ri) };
                    parent[child] = root;
                }
            }
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut groups: Vec<Vec<OutputDescriptor>> = Vec::new();
    for (i, output) in active.iter().enumerate() {
        let root = find(&mut parent, i);
        match roots.iter().position(|&r| r == root) {
            Some(slot) => groups[slot].push((*output).clone()),
            None => {
                roots.push(root);
                groups.push(vec![(*output).clone()]);
            }
        }
    }
    groups
}

/// Resolves a policy from its configuration name.
pub fn policy_by_name(name: &str) -> Option<Box<dyn MergePolicy>> {
    match name {
        "default" => Some(Box::new(DefaultMergePolicy)),
        "identical-geometry" => Some(Box::new(IdenticalGeometry)),
        "native-units" => Some(Box::new(NativeUnits)),
        "never" => Some(Box::new(NeverMerge)),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
