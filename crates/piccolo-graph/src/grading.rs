//! Candidate grading and selection.
//!
//! Grades come from an external process; the comparison direction is
//! fixed at construction from [`GradeOrder`]. Ungraded candidates rank
//! after graded ones, and ties fall back to ascending candidate number.

use piccolo_core::{CandidateNumber, ChainError, FactStore, GradeOrder, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::candidates::CandidateSet;

/// A candidate and its grade, `None` when ungraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternate {
    /// Candidate number
    pub candidate: CandidateNumber,
    /// Grade under the requested trust context
    pub grade: Option<i64>,
}

/// Ranks the built candidates of a chain hash.
#[derive(Debug)]
pub struct ChainGrader<'a, S: ?Sized> {
    store: &'a S,
    order: GradeOrder,
}

impl<'a, S: FactStore + ?Sized> ChainGrader<'a, S> {
    /// Grader using `order` to decide which grade is better.
    pub const fn new(store: &'a S, order: GradeOrder) -> Self {
        Self { store, order }
    }

    /// The configured comparison direction.
    pub const fn order(&self) -> GradeOrder {
        self.order
    }

    /// Grade of one candidate. `None` means ungraded, which is not a grade of zero.
    ///
    /// With several grades on record for the candidate, the better one under
    /// the configured order is reported, matching the ranking.
    pub fn grade(
        &self,
        chain_hash: &str,
        candidate: CandidateNumber,
        trust_context: &str,
    ) -> Result<Option<i64>> {
        let (candidates, _) = CandidateSet::load(self.store, chain_hash)?;
        let graded = self.graded_map(chain_hash, &candidates, trust_context)?;
        Ok(graded.get(&candidate).copied())
    }

    /// The best graded candidate, or the first candidate (0) when none is graded.
    ///
    /// Fails with `NotFound` when the chain has no built candidates.
    pub fn best_candidate(
        &self,
        chain_hash: &str,
        trust_context: &str,
    ) -> Result<CandidateNumber> {
        let ranked = self.rank(chain_hash, Some(trust_context))?;
        let best = ranked
            .first()
            .ok_or_else(|| ChainError::not_found(format!("candidates of chain {chain_hash}")))?;

        if best.grade.is_some() {
            debug!(
                chain = %chain_hash,
                trust_context,
                candidate = best.candidate,
                grade = best.grade,
                "selected best graded candidate"
            );
            return Ok(best.candidate);
        }

        let fallback = ranked
            .iter()
            .map(|a| a.candidate)
            .min()
            .unwrap_or_default();
        debug!(
            chain = %chain_hash,
            trust_context,
            candidate = fallback,
            "no graded candidate, using default"
        );
        Ok(fallback)
    }

    /// Every candidate except `exclude`, best first.
    pub fn alternates(
        &self,
        chain_hash: &str,
        exclude: CandidateNumber,
        trust_context: &str,
    ) -> Result<Vec<Alternate>> {
        Ok(self
            .rank(chain_hash, Some(trust_context))?
            .into_iter()
            .filter(|a| a.candidate != exclude)
            .collect())
    }

    /// Every candidate except `exclude`, ungraded, by candidate number.
    pub fn ungraded_alternates(
        &self,
        chain_hash: &str,
        exclude: CandidateNumber,
    ) -> Result<Vec<Alternate>> {
        Ok(self
            .rank(chain_hash, None)?
            .into_iter()
            .filter(|a| a.candidate != exclude)
            .collect())
    }

    fn rank(&self, chain_hash: &str, trust_context: Option<&str>) -> Result<Vec<Alternate>> {
        let (candidates, _) = CandidateSet::load(self.store, chain_hash)?;
        if candidates.is_empty() {
            return Err(ChainError::not_found(format!(
                "candidates of chain {chain_hash}"
            )));
        }

        let grades = match trust_context {
            Some(context) => self.graded_map(chain_hash, &candidates, context)?,
            None => HashMap::new(),
        };

        let mut ranked: Vec<Alternate> = candidates
            .numbers()
            .map(|candidate| Alternate {
                candidate,
                grade: grades.get(&candidate).copied(),
            })
            .collect();
        ranked.sort_by(|a, b| self.compare(a, b));
        Ok(ranked)
    }

    /// Best recorded grade of every existing candidate under `trust_context`.
    fn graded_map(
        &self,
        chain_hash: &str,
        candidates: &CandidateSet,
        trust_context: &str,
    ) -> Result<HashMap<CandidateNumber, i64>> {
        let mut grades: HashMap<CandidateNumber, i64> = HashMap::new();
        for g in self.store.grades(chain_hash, trust_context)? {
            if !candidates.contains(g.candidate) {
                warn!(
                    chain = %chain_hash,
                    candidate = g.candidate,
                    "grade for unknown candidate ignored"
                );
                continue;
            }
            grades
                .entry(g.candidate)
                .and_modify(|current| {
                    if self.order.compare(g.grade, *current) == Ordering::Less {
                        *current = g.grade;
                    }
                })
                .or_insert(g.grade);
        }
        Ok(grades)
    }

    fn compare(&self, a: &Alternate, b: &Alternate) -> Ordering {
        let by_grade = match (a.grade, b.grade) {
            (Some(x), Some(y)) => self.order.compare(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_grade.then_with(|| a.candidate.cmp(&b.candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Facts;
    use piccolo_core::MemoryStore;

    fn graded(grades: &[(u32, i64)]) -> MemoryStore {
        let mut facts = Facts::new().certs(&["leaf"]);
        for candidate in 0..3 {
            facts = facts.built("xyz", candidate, &["leaf"], true);
        }
        for &(candidate, grade) in grades {
            facts = facts.grade("xyz", candidate, "trusted", grade);
        }
        facts.store()
    }

    #[test]
    fn scenario_b_lower_is_better() {
        let store = Facts::new()
            .certs(&["leaf"])
            .built("xyz", 0, &["leaf"], true)
            .built("xyz", 1, &["leaf"], true)
            .grade("xyz", 0, "trusted", 20)
            .grade("xyz", 1, "trusted", 10)
            .store();
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 1);
    }

    #[test]
    fn higher_is_better_flips_selection() {
        let store = graded(&[(0, 20), (1, 10), (2, 15)]);
        let grader = ChainGrader::new(&store, GradeOrder::HigherIsBetter);
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 0);
        let order: Vec<u32> = grader
            .alternates("xyz", 0, "trusted")
            .unwrap()
            .iter()
            .map(|a| a.candidate)
            .collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn ungraded_falls_back_to_candidate_zero() {
        let store = graded(&[]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 0);
        assert!(grader.grade("xyz", 0, "trusted").unwrap().is_none());
    }

    #[test]
    fn grades_in_other_contexts_are_ignored() {
        let store = Facts::new()
            .certs(&["leaf"])
            .built("xyz", 0, &["leaf"], true)
            .built("xyz", 1, &["leaf"], true)
            .grade("xyz", 1, "other", 1)
            .store();
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 0);
        assert_eq!(grader.best_candidate("xyz", "other").unwrap(), 1);
    }

    #[test]
    fn zero_grade_is_a_grade() {
        let store = graded(&[(2, 0)]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.grade("xyz", 2, "trusted").unwrap(), Some(0));
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 2);
    }

    #[test]
    fn ties_break_by_candidate_number() {
        let store = graded(&[(2, 5), (1, 5), (0, 9)]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.best_candidate("xyz", "trusted").unwrap(), 1);
        assert_eq!(
            grader.alternates("xyz", 0, "trusted").unwrap(),
            vec![
                Alternate {
                    candidate: 1,
                    grade: Some(5),
                },
                Alternate {
                    candidate: 2,
                    grade: Some(5),
                },
            ]
        );
    }

    #[test]
    fn ungraded_alternates_rank_last() {
        let store = graded(&[(2, 3)]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(
            grader.alternates("xyz", 1, "trusted").unwrap(),
            vec![
                Alternate {
                    candidate: 2,
                    grade: Some(3),
                },
                Alternate {
                    candidate: 0,
                    grade: None,
                },
            ]
        );
    }

    #[test]
    fn single_candidate_has_no_alternates() {
        let store = Facts::new()
            .certs(&["leaf"])
            .built("one", 0, &["leaf"], true)
            .grade("one", 0, "trusted", 1)
            .store();
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert!(grader.alternates("one", 0, "trusted").unwrap().is_empty());
    }

    #[test]
    fn best_candidate_always_exists() {
        let store = Facts::new()
            .certs(&["leaf"])
            .built("xyz", 0, &["leaf"], true)
            .built("xyz", 1, &["leaf"], true)
            .grade("xyz", 7, "trusted", -100)
            .grade("xyz", 1, "trusted", 4)
            .store();
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        let best = grader.best_candidate("xyz", "trusted").unwrap();
        assert_eq!(best, 1);
        assert!(store.built_chain("xyz", best).unwrap().is_some());
    }

    #[test]
    fn chain_without_candidates_is_not_found() {
        let store = Facts::new()
            .certs(&["leaf"])
            .sent("sent-only", &["leaf"])
            .store();
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert!(grader
            .best_candidate("sent-only", "trusted")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn duplicate_grades_report_the_ranked_value() {
        let store = graded(&[(0, 20), (0, 5), (1, 10)]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);

        let best = grader.best_candidate("xyz", "trusted").unwrap();
        assert_eq!(best, 0);
        assert_eq!(grader.grade("xyz", best, "trusted").unwrap(), Some(5));

        let alternates = grader.alternates("xyz", best, "trusted").unwrap();
        assert_eq!(alternates[0].candidate, 1);
        assert!(grader.grade("xyz", best, "trusted").unwrap() <= alternates[0].grade);
    }

    #[test]
    fn grade_of_unknown_candidate_is_none() {
        let store = graded(&[(7, 1)]);
        let grader = ChainGrader::new(&store, GradeOrder::LowerIsBetter);
        assert_eq!(grader.grade("xyz", 7, "trusted").unwrap(), None);
    }
}
