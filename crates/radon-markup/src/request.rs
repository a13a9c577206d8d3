//! Request assembler: whole documents in and out of the arena.
//!
//! `RadonMarkup` owns one arena per document. The handle-level view
//! (`CachedMarkup`) is what edits operate on; `markup()` expands it for
//! presentation and `mir()` lowers it back to compact form.

use serde::{Deserialize, Serialize};

use radon_core::catalog::Catalog;
use radon_core::config::MarkupConfig;
use radon_core::error::{Error, Result};
use radon_core::hash::{hash_serde, Hash256};
use radon_core::id::CacheRef;
use radon_core::mir::{Mir, MirOperator, MirRequest, MirScript, MirSource};

use crate::cache::Cache;
use crate::expand::{expand_script, ExpandedSelect};
use crate::generate::{Generator, PlannedOperator};
use crate::lower::lower_script;
use crate::markup::{ArgumentOptions, MarkupNode};
use crate::metrics::{record_conversion, ConversionStats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSource {
    pub url: String,
    pub script: Vec<CacheRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedRequest {
    pub not_before: u64,
    pub retrieve: Vec<CachedSource>,
    pub aggregate: Vec<CacheRef>,
    pub tally: Vec<CacheRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedMarkup {
    pub name: String,
    pub description: String,
    pub rad_request: CachedRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupSource {
    pub url: String,
    pub script: Vec<ExpandedSelect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRequest {
    pub not_before: u64,
    pub retrieve: Vec<MarkupSource>,
    pub aggregate: Vec<ExpandedSelect>,
    pub tally: Vec<ExpandedSelect>,
}

/// Fully expanded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markup {
    pub name: String,
    pub description: String,
    pub rad_request: MarkupRequest,
}

/// Addresses one script of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Retrieve(usize),
    Aggregate,
    Tally,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Retrieve(i) => write!(f, "retrieve[{i}]"),
            Stage::Aggregate => f.write_str("aggregate"),
            Stage::Tally => f.write_str("tally"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RadonMarkup<'c> {
    pub(crate) catalog: &'c Catalog,
    pub(crate) options: &'static ArgumentOptions,
    pub(crate) cache: Cache<MarkupNode>,
    pub(crate) cached: CachedMarkup,
}

impl<'c> RadonMarkup<'c> {
    /// Convert `mir`, or start from the empty document when none is given.
    pub fn new(catalog: &'c Catalog, mir: Option<&Mir>) -> Result<Self> {
        Self::with_config(catalog, mir, &MarkupConfig::default())
    }

    pub fn with_config(
        catalog: &'c Catalog,
        mir: Option<&Mir>,
        config: &MarkupConfig,
    ) -> Result<Self> {
        let mut markup = Self {
            catalog,
            options: ArgumentOptions::shared(),
            cache: Cache::with_origin(config.cache_origin),
            cached: CachedMarkup {
                name: String::new(),
                description: String::new(),
                rad_request: CachedRequest {
                    not_before: 0,
                    retrieve: Vec::new(),
                    aggregate: Vec::new(),
                    tally: Vec::new(),
                },
            },
        };
        let default_mir;
        let mir = match mir {
            Some(mir) => mir,
            None => {
                default_mir = Mir::default();
                &default_mir
            }
        };
        markup.cached = markup.mir_to_markup(mir)?;
        Ok(markup)
    }

    pub(crate) fn generator(&self) -> Generator<'c> {
        Generator::new(self.catalog, self.options)
    }

    /// Convert a whole document into the arena. All scripts are planned,
    /// and checked against the arena's free ids, before anything is
    /// inserted.
    pub fn mir_to_markup(&mut self, mir: &Mir) -> Result<CachedMarkup> {
        let generator = self.generator();
        let request = &mir.rad_request;

        let retrieve = request
            .retrieve
            .iter()
            .map(|source| generator.plan_script(&source.script))
            .collect::<Result<Vec<_>>>()?;
        let aggregate = generator.plan_script(&request.aggregate)?;
        let tally = generator.plan_script(&request.tally)?;

        let mut stats = {
            let scripts: Vec<&[PlannedOperator<'c>]> = retrieve
                .iter()
                .map(Vec::as_slice)
                .chain([aggregate.as_slice(), tally.as_slice()])
                .collect();
            ConversionStats::from_plans(request.retrieve.len(), &scripts)
        };
        self.cache.ensure_room(stats.nodes)?;

        let first = self.cache.next_handle();
        let retrieve = request
            .retrieve
            .iter()
            .zip(retrieve)
            .map(|(source, planned)| {
                Ok(CachedSource {
                    url: source.url.clone(),
                    script: generator.commit_script(&mut self.cache, planned)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let aggregate = generator.commit_script(&mut self.cache, aggregate)?;
        let tally = generator.commit_script(&mut self.cache, tally)?;

        stats.first = first.filter(|_| stats.nodes > 0);
        record_conversion(None, &stats);

        Ok(CachedMarkup {
            name: mir.name.clone(),
            description: mir.description.clone(),
            rad_request: CachedRequest {
                not_before: request.not_before,
                retrieve,
                aggregate,
                tally,
            },
        })
    }

    /// Convert one script into handles appended to this arena.
    pub fn generate_script(&mut self, script: &[MirOperator]) -> Result<Vec<CacheRef>> {
        self.generator().script_to_tree(&mut self.cache, script)
    }

    /// Expanded view of the current document.
    pub fn markup(&self) -> Result<Markup> {
        let request = &self.cached.rad_request;
        let retrieve = request
            .retrieve
            .iter()
            .map(|source| {
                Ok(MarkupSource {
                    url: source.url.clone(),
                    script: expand_script(&self.cache, &source.script)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Markup {
            name: self.cached.name.clone(),
            description: self.cached.description.clone(),
            rad_request: MarkupRequest {
                not_before: request.not_before,
                retrieve,
                aggregate: expand_script(&self.cache, &request.aggregate)?,
                tally: expand_script(&self.cache, &request.tally)?,
            },
        })
    }

    /// Compact form of the current document.
    pub fn mir(&self) -> Result<Mir> {
        let request = &self.cached.rad_request;
        let retrieve = request
            .retrieve
            .iter()
            .map(|source| {
                Ok(MirSource {
                    url: source.url.clone(),
                    script: self.lower(&source.script)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Mir {
            name: self.cached.name.clone(),
            description: self.cached.description.clone(),
            rad_request: MirRequest {
                not_before: request.not_before,
                retrieve,
                aggregate: self.lower(&request.aggregate)?,
                tally: self.lower(&request.tally)?,
            },
        })
    }

    pub fn lower(&self, script: &[CacheRef]) -> Result<MirScript> {
        lower_script(self.catalog, &self.cache, script)
    }

    /// Fingerprint of the expanded document; changes whenever an edit
    /// changes what a renderer would show.
    pub fn snapshot_hash(&self) -> Result<Hash256> {
        hash_serde(&self.markup()?)
    }

    pub fn script(&self, stage: Stage) -> Result<&[CacheRef]> {
        let request = &self.cached.rad_request;
        match stage {
            Stage::Retrieve(i) => request
                .retrieve
                .get(i)
                .map(|s| s.script.as_slice())
                .ok_or_else(|| missing_source(i)),
            Stage::Aggregate => Ok(&request.aggregate),
            Stage::Tally => Ok(&request.tally),
        }
    }

    pub(crate) fn script_mut(&mut self, stage: Stage) -> Result<&mut Vec<CacheRef>> {
        let request = &mut self.cached.rad_request;
        match stage {
            Stage::Retrieve(i) => request
                .retrieve
                .get_mut(i)
                .map(|s| &mut s.script)
                .ok_or_else(|| missing_source(i)),
            Stage::Aggregate => Ok(&mut request.aggregate),
            Stage::Tally => Ok(&mut request.tally),
        }
    }

    pub fn cached(&self) -> &CachedMarkup {
        &self.cached
    }

    pub fn cache(&self) -> &Cache<MarkupNode> {
        &self.cache
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }
}

pub(crate) fn missing_source(i: usize) -> Error {
    Error::OutOfRange(format!("no retrieve source at index {i}"))
}
