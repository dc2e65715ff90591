// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Batch-scoped decode state: identity registries and the XLink registry.
//!
//! A [`DecodeContext`] lives for exactly one batch decode and is threaded
//! through every recursive call. There is no process-global state; two
//! batches never share registrations. The context is not meant to be
//! shared across threads, and exactly one batch decode is assumed to be
//! in flight per instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use log::warn;

use crate::feature::{FeatureRef, LinkRef, XLink};

/// Prefix of hrefs naming a feature by its business identifier.
const URN_UUID: &str = "urn:uuid:";

/// Mutable state of one decode batch.
#[derive(Debug, Default)]
pub struct DecodeContext {
    ids: HashMap<String, FeatureRef>,
    identifiers: HashMap<String, FeatureRef>,
    // Insertion order keeps resolution diagnostics deterministic.
    links: IndexMap<String, LinkRef>,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly decoded record under its identity keys.
    ///
    /// A colliding key overwrites the earlier registration (last write
    /// wins, as the upstream data should not contain duplicates).
    pub(crate) fn register(&mut self, feature: &FeatureRef) {
        let record = feature.borrow();

        if let Some(id) = &record.id {
            if self.ids.insert(id.clone(), Rc::clone(feature)).is_some() {
                warn!("duplicate gml:id {id}, keeping the later feature");
            }
        }
        if let Some(identifier) = &record.identifier {
            if self
                .identifiers
                .insert(identifier.clone(), Rc::clone(feature))
                .is_some()
            {
                warn!("duplicate gml:identifier {identifier}, keeping the later feature");
            }
        }
    }

    /// Returns the XLink placeholder for an href, creating it on first use.
    ///
    /// All occurrences of the same href within one batch share a single
    /// placeholder, so resolution assigns each target exactly once.
    pub(crate) fn link(&mut self, href: &str, title: Option<&str>) -> LinkRef {
        if let Some(link) = self.links.get(href) {
            return Rc::clone(link);
        }

        let link = Rc::new(RefCell::new(XLink::new(href, title)));
        self.links.insert(href.to_string(), Rc::clone(&link));
        link
    }

    /// Looks up a feature by its `gml:id`.
    pub fn feature_by_id(&self, id: &str) -> Option<FeatureRef> {
        self.ids.get(id).map(Rc::clone)
    }

    /// Looks up a feature by its business identifier.
    pub fn feature_by_identifier(&self, identifier: &str) -> Option<FeatureRef> {
        self.identifiers.get(identifier).map(Rc::clone)
    }

    /// Looks up the shared XLink placeholder for an href.
    pub fn link_for(&self, href: &str) -> Option<LinkRef> {
        self.links.get(href).map(Rc::clone)
    }

    /// Number of features registered by id.
    pub fn feature_count(&self) -> usize {
        self.ids.len()
    }

    /// Resolves every XLink against the identity registries.
    ///
    /// Fragment hrefs (`#id`) resolve against the id registry, URN hrefs
    /// (`urn:uuid:...`) against the identifier registry; anything else is
    /// unresolvable. Unresolvable links are logged and left without a
    /// target; they never fail the batch. Already resolved links are
    /// skipped, so resolving twice yields identical assignments.
    pub fn resolve(&mut self) {
        for (href, link) in &self.links {
            if link.borrow().is_resolved() {
                continue;
            }

            let target = if let Some(id) = href.strip_prefix('#') {
                self.ids.get(id)
            } else if let Some(identifier) = href.strip_prefix(URN_UUID) {
                self.identifiers.get(identifier)
            } else {
                // External references and natural keys are not supported.
                None
            };

            match target {
                Some(feature) => link.borrow_mut().set_target(feature),
                None => warn!("can't resolve xlink:href: {href}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureRecord;

    fn feature(id: &str, identifier: Option<&str>) -> FeatureRef {
        let mut record = FeatureRecord::new("Navaid", Some(id.to_string()), None);
        record.identifier = identifier.map(str::to_string);
        Rc::new(RefCell::new(record))
    }

    #[test]
    fn links_are_deduplicated_by_href() {
        let mut ctx = DecodeContext::new();
        let a = ctx.link("#x", None);
        let b = ctx.link("#x", Some("later title is ignored"));

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.borrow().title, None);
    }

    #[test]
    fn resolves_fragment_hrefs_against_ids() {
        let mut ctx = DecodeContext::new();
        let target = feature("xyz", None);
        ctx.register(&target);
        let link = ctx.link("#xyz", None);

        ctx.resolve();

        let resolved = link.borrow().target().unwrap();
        assert!(Rc::ptr_eq(&resolved, &target));
    }

    #[test]
    fn resolves_urn_hrefs_against_identifiers() {
        let mut ctx = DecodeContext::new();
        let target = feature("uuid.abc", Some("abc"));
        ctx.register(&target);
        let link = ctx.link("urn:uuid:abc", None);

        ctx.resolve();

        let resolved = link.borrow().target().unwrap();
        assert!(Rc::ptr_eq(&resolved, &target));
    }

    #[test]
    fn unknown_href_scheme_stays_unresolved() {
        let mut ctx = DecodeContext::new();
        let link = ctx.link("https://example.com/x", None);

        ctx.resolve();

        assert!(!link.borrow().is_resolved());
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut ctx = DecodeContext::new();
        let target = feature("xyz", None);
        ctx.register(&target);
        let link = ctx.link("#xyz", None);

        ctx.resolve();
        let first = link.borrow().target().unwrap();
        ctx.resolve();
        let second = link.borrow().target().unwrap();

        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn duplicate_id_keeps_the_later_registration() {
        let mut ctx = DecodeContext::new();
        let first = feature("dup", None);
        let second = feature("dup", None);
        ctx.register(&first);
        ctx.register(&second);

        let stored = ctx.feature_by_id("dup").unwrap();
        assert!(Rc::ptr_eq(&stored, &second));
    }
}
