use {
    crate::resolver::Resolver,
    catalog_resources::Catalog,
    unlocks_resources::{AvailabilitySnapshot, FreeTabs, UnlockLedger},
};

/// Outcome of one ledger mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionReport {
    /// False when the mutation was a no-op. Nothing was recomputed then.
    pub changed: bool,
    /// Derived items that became available, sorted case-insensitively.
    pub newly_available: Vec<String>,
}

/// Applies `mutation` between two full closure recomputes and publishes the
/// new snapshot.
///
/// The mutation reports whether it changed the ledger. Persisting the ledger
/// is left to the caller, which does so whenever `changed` is set.
pub fn apply_mutation_and_notify(
    catalog: &Catalog,
    free_tabs: &FreeTabs,
    ledger: &mut UnlockLedger,
    snapshot: &mut AvailabilitySnapshot,
    mutation: impl FnOnce(&mut UnlockLedger) -> bool,
) -> TransitionReport {
    let before = Resolver::new(catalog, ledger, free_tabs).recompute_closure();

    if !mutation(ledger) {
        return TransitionReport::default();
    }

    let after = Resolver::new(catalog, ledger, free_tabs).recompute_closure();
    let newly_available = newly_available(catalog, &before, &after);
    *snapshot = after;

    TransitionReport {
        changed: true,
        newly_available,
    }
}

fn newly_available(
    catalog: &Catalog,
    before: &AvailabilitySnapshot,
    after: &AvailabilitySnapshot,
) -> Vec<String> {
    let mut names: Vec<String> = catalog
        .derived_items()
        .iter()
        .filter(|derived| {
            derived
                .representative_id()
                .is_some_and(|id| after.contains(id) && !before.contains(id))
        })
        .map(|derived| derived.name.clone())
        .collect();

    names.sort_by_key(|name| name.to_lowercase());
    names
}
