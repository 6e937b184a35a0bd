//! Lazy resolution of class constant fetches.
//!
//! `X::NAME` cannot be attributed to a declaring type while files are still
//! being collected: the qualifier may be `self`, `parent` or an expression
//! that needs the finished index to infer. Fetches are queued during
//! collection and resolved on the first query. Later queries read the
//! resolved map; fetches collected after that are resolved on the next query.

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::index::SymbolIndex;
use super::names;
use super::symbols::{ConstFetchSite, PendingConstFetch};

impl SymbolIndex {
    /// Types that fetch `constant` declared on `type_name`.
    ///
    /// Fetches outside any named type are counted as sites (see
    /// [`SymbolIndex::find_class_constant_fetch_sites`]) but have no fetching
    /// type to report here.
    pub fn find_class_constant_fetches(
        &self,
        type_name: &str,
        constant: &str,
    ) -> Option<IndexSet<SmolStr>> {
        let sites = self.find_class_constant_fetch_sites(type_name, constant)?;
        Some(sites.into_iter().filter_map(|site| site.fetcher).collect())
    }

    /// Every site fetching `constant` declared on `type_name`.
    pub fn find_class_constant_fetch_sites(
        &self,
        type_name: &str,
        constant: &str,
    ) -> Option<IndexSet<ConstFetchSite>> {
        self.resolve_pending_fetches();
        let key = self.constant_key(type_name, constant)?;
        self.const_fetches.read().get(&key).cloned()
    }

    /// Number of fetches still waiting for resolution.
    pub fn pending_const_fetch_count(&self) -> usize {
        self.pending_fetches.lock().len()
    }

    /// Drain the pending fetches and file each under its declaring type.
    ///
    /// Resolution is the only writer of the resolved map. It holds the
    /// resolution guard from draining to filing, so a concurrent query waits
    /// for the filing to finish instead of reading a partial map. The guard
    /// is reentrant: a type resolver may query the index from inside.
    pub(super) fn resolve_pending_fetches(&self) {
        let _guard = self.resolution.lock();
        let pending = std::mem::take(&mut *self.pending_fetches.lock());
        if pending.is_empty() {
            return;
        }
        let _span = tracing::debug_span!("resolve_const_fetches", count = pending.len()).entered();

        let resolved: Vec<_> = pending
            .iter()
            .filter_map(|fetch| {
                let (owner, constant) = self.resolve_fetch(fetch)?;
                let site = ConstFetchSite {
                    fetcher: fetch.caller.class_name().map(SmolStr::new),
                    file: fetch.file,
                };
                Some((owner, constant, site))
            })
            .collect();

        tracing::debug!("resolved {} of {} constant fetches", resolved.len(), pending.len());

        let mut map = self.const_fetches.write();
        for (owner, constant, site) in resolved {
            let key = self.intern_constant_key(&owner, &constant);
            map.entry(key).or_default().insert(site);
        }
    }

    /// The (declaring type, constant) a fetch refers to.
    fn resolve_fetch(&self, fetch: &PendingConstFetch) -> Option<(SmolStr, SmolStr)> {
        let constant = names::get_name(&fetch.constant)?;
        if names::is_name(constant, "class") || names::looks_qualified(constant) {
            return None;
        }

        let candidates = self.static_receiver_types(&fetch.class, &fetch.caller);
        let owner = match candidates.as_slice() {
            [] => {
                tracing::trace!("dropping fetch of '{}' with unresolvable qualifier", constant);
                return None;
            }
            [single] => self
                .find_constant_in_chain(single, constant)
                .map(|decl| decl.owner.clone())
                .unwrap_or_else(|| single.clone()),
            [first, ..] => self
                .first_declaring_candidate(&candidates, constant)
                .unwrap_or_else(|| first.clone()),
        };
        Some((owner, SmolStr::new(constant)))
    }

    /// Among several candidates, the earliest-declared type that declares
    /// `constant` among its own members. Supertypes are not consulted.
    fn first_declaring_candidate(&self, candidates: &[SmolStr], constant: &str) -> Option<SmolStr> {
        candidates
            .iter()
            .filter_map(|candidate| self.find_class_like(candidate))
            .filter(|decl| decl.declares_constant(constant))
            .min_by_key(|decl| decl.order)
            .map(|decl| decl.name.clone())
    }
}
