//! Ancestor and descendant expansion with hop distances.
//!
//! Results are sorted ascending by distance. Within one distance the order
//! follows the store and carries no meaning.

use piccolo_core::{CertHash, ChainError, DirectLink, FactStore, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config::{GraphConfig, TransitiveSource};

/// A related certificate and its hop distance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relative {
    /// Related certificate
    pub cert: CertHash,
    /// Issuance edges between the two (>= 1)
    pub distance: u32,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Expands issuance relationships of a certificate.
#[derive(Debug)]
pub struct Expander<'a, S: ?Sized> {
    store: &'a S,
    source: TransitiveSource,
    max_hops: u32,
}

impl<'a, S: FactStore + ?Sized> Expander<'a, S> {
    /// Expander following the configured transitive source.
    pub const fn new(store: &'a S, config: &GraphConfig) -> Self {
        Self {
            store,
            source: config.transitive_source,
            max_hops: config.max_hops,
        }
    }

    /// Expander over the precomputed closure.
    pub const fn precomputed(store: &'a S) -> Self {
        Self {
            store,
            source: TransitiveSource::Precomputed,
            max_hops: u32::MAX,
        }
    }

    /// Expander walking direct links at most `max_hops` deep.
    pub const fn direct_walk(store: &'a S, max_hops: u32) -> Self {
        Self {
            store,
            source: TransitiveSource::DirectWalk,
            max_hops,
        }
    }

    /// Every certificate that issued `cert`, directly or transitively.
    ///
    /// Fails with `NotFound` if `cert` is not a known certificate. A known
    /// certificate without links yields an empty sequence.
    pub fn ancestors(&self, cert: &str) -> Result<Vec<Relative>> {
        self.expand(cert, Direction::Up)
    }

    /// Every certificate issued by `cert`, directly or transitively.
    pub fn descendants(&self, cert: &str) -> Result<Vec<Relative>> {
        self.expand(cert, Direction::Down)
    }

    /// Distance-1 ancestors.
    pub fn direct_issuers(&self, cert: &str) -> Result<Vec<CertHash>> {
        Ok(self
            .ancestors(cert)?
            .into_iter()
            .take_while(|r| r.distance == 1)
            .map(|r| r.cert)
            .collect())
    }

    fn expand(&self, cert: &str, direction: Direction) -> Result<Vec<Relative>> {
        if self.store.certificate(cert)?.is_none() {
            return Err(ChainError::not_found(format!("certificate {cert}")));
        }

        let mut relatives = match self.source {
            TransitiveSource::Precomputed => self.from_closure(cert, direction)?,
            TransitiveSource::DirectWalk => self.walk(cert, direction)?,
        };
        relatives.sort_by_key(|r| r.distance);
        debug!(cert, ?direction, found = relatives.len(), "expanded relationships");
        Ok(relatives)
    }

    fn from_closure(&self, cert: &str, direction: Direction) -> Result<Vec<Relative>> {
        let relatives = match direction {
            Direction::Up => self
                .store
                .transitive_issuers(cert)?
                .into_iter()
                .map(|l| Relative {
                    cert: l.issuer_hash,
                    distance: l.distance,
                })
                .collect(),
            Direction::Down => self
                .store
                .transitive_subjects(cert)?
                .into_iter()
                .map(|l| Relative {
                    cert: l.subject_hash,
                    distance: l.distance,
                })
                .collect(),
        };
        Ok(relatives)
    }

    /// Breadth-first over direct links; each certificate is reported once,
    /// at its shortest distance. Cycles terminate via the visited set and
    /// the hop ceiling.
    fn walk(&self, cert: &str, direction: Direction) -> Result<Vec<Relative>> {
        let mut visited: HashSet<CertHash> = HashSet::from([cert.to_string()]);
        let mut frontier = vec![cert.to_string()];
        let mut relatives = Vec::new();

        for distance in 1..=self.max_hops {
            let mut next = Vec::new();
            for current in &frontier {
                for link in self.neighbours(current, direction)? {
                    let other = match direction {
                        Direction::Up => link.issuer_hash,
                        Direction::Down => link.subject_hash,
                    };
                    if visited.insert(other.clone()) {
                        relatives.push(Relative {
                            cert: other.clone(),
                            distance,
                        });
                        next.push(other);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(relatives)
    }

    fn neighbours(&self, cert: &str, direction: Direction) -> Result<Vec<DirectLink>> {
        match direction {
            Direction::Up => self.store.direct_issuers(cert),
            Direction::Down => self.store.direct_subjects(cert),
        }
    }
}
