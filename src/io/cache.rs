//! Amortizing repeated parameter lookups across spectra that share an
//! acquisition level.
//!
//! Scanning a live parameter list is the expensive operation here because it
//! is backed by a vendor call. Spectra recorded at the same acquisition level
//! typically expose an identical parameter layout, so the position a name was
//! found at once can be reused for the rest of the run.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::params::ParamList;

/// The requested name and every registered alternative spelling were absent
/// from the live parameter list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter {name:?} was not found in the live parameter list under any registered spelling")]
pub struct ParameterNotFoundError {
    pub name: String,
}

impl ParameterNotFoundError {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self { name: name.into() }
    }
}

/**
Learned name-to-slot bindings for the live parameter lists of one
acquisition level.

The slot map is append-only during normal operation. When a live list's
shape stops matching a recorded slot, [`ParameterCache::update`] rescans the
list once and rebinds every slot while keeping previously learned
alternative-name bindings.
*/
#[derive(Debug, Default, Clone)]
pub struct ParameterCache {
    slot_by_name: HashMap<String, usize>,
    canonical_by_alias: HashMap<String, String>,
}

impl ParameterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an alternative spelling to the canonical name callers request.
    /// A live list carrying `alternative` will then satisfy requests for
    /// `canonical`.
    pub fn register_alias<A: Into<String>, C: Into<String>>(&mut self, alternative: A, canonical: C) {
        self.canonical_by_alias
            .insert(alternative.into(), canonical.into());
    }

    /// The number of names with a recorded slot
    pub fn len(&self) -> usize {
        self.slot_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_by_name.is_empty()
    }

    /// The recorded slot for `name`, if one has been learned
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slot_by_name.get(name).copied()
    }

    /**
    Look up `name` in `params`, learning its slot on first contact.

    A recorded slot is trusted as long as the parameter resident there still
    answers to `name`; otherwise the bucket is rebuilt from one fresh scan
    of the list and the lookup is retried. Exhaustion of the name and every
    registered alternative fails with [`ParameterNotFoundError`] rather than
    substituting a default.
    */
    pub fn get<'p>(
        &mut self,
        name: &str,
        params: &'p ParamList,
    ) -> Result<&'p str, ParameterNotFoundError> {
        if let Some(value) = self.cached_lookup(name, params) {
            return Ok(value);
        }
        self.update(params);
        self.cached_lookup(name, params)
            .ok_or_else(|| ParameterNotFoundError::new(name))
    }

    fn cached_lookup<'p>(&self, name: &str, params: &'p ParamList) -> Option<&'p str> {
        let slot = self.slot_of(name)?;
        let param = params.get(slot)?;
        self.answers_to(&param.name, name)
            .then_some(param.value.as_str())
    }

    /// Whether a parameter named `live_name` satisfies a request for
    /// `requested`, directly or through an alias binding
    fn answers_to(&self, live_name: &str, requested: &str) -> bool {
        live_name == requested
            || self
                .canonical_by_alias
                .get(live_name)
                .is_some_and(|canonical| canonical == requested)
    }

    /// Rescan `params` once and rebind every slot. Alias bindings survive
    /// the rebuild; first occurrence wins for duplicated names.
    pub fn update(&mut self, params: &ParamList) {
        log::trace!(
            "rescanning a live parameter list of {} entries ({} slots previously bound)",
            params.len(),
            self.slot_by_name.len()
        );
        self.slot_by_name.clear();
        for (slot, param) in params.iter().enumerate() {
            self.slot_by_name.entry(param.name.clone()).or_insert(slot);
            if let Some(canonical) = self.canonical_by_alias.get(&param.name) {
                self.slot_by_name.entry(canonical.clone()).or_insert(slot);
            }
        }
    }
}

/**
The set of per-acquisition-level [`ParameterCache`] buckets owned by one
reader.

Buckets are created on first touch. Each bucket carries its own lock so that
materializations touching distinct acquisition levels never contend; the
outer map lock is held only long enough to hand out the bucket.
*/
#[derive(Debug, Default)]
pub struct ParameterCacheMap {
    buckets: Mutex<HashMap<u8, Arc<Mutex<ParameterCache>>>>,
    aliases: Vec<(String, String)>,
}

impl ParameterCacheMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alternative spelling applied to every bucket created
    /// afterwards. Call before materialization begins.
    pub fn register_alias<A: Into<String>, C: Into<String>>(&mut self, alternative: A, canonical: C) {
        self.aliases.push((alternative.into(), canonical.into()));
    }

    /// The bucket for `level`, created and seeded with the registered
    /// aliases on first touch
    pub fn bucket(&self, level: u8) -> Arc<Mutex<ParameterCache>> {
        let mut buckets = self.buckets.lock();
        buckets
            .entry(level)
            .or_insert_with(|| {
                let mut cache = ParameterCache::new();
                for (alternative, canonical) in &self.aliases {
                    cache.register_alias(alternative.clone(), canonical.clone());
                }
                Arc::new(Mutex::new(cache))
            })
            .clone()
    }

    /// Look `name` up in `params` through the bucket for `level`
    pub fn get(
        &self,
        level: u8,
        name: &str,
        params: &ParamList,
    ) -> Result<String, ParameterNotFoundError> {
        let bucket = self.bucket(level);
        let mut cache = bucket.lock();
        cache.get(name, params).map(str::to_string)
    }
}
