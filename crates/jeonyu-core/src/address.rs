//! AddressResolver: free text → lot key.

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::registry::{AddressCandidate, LotKey, ResolvedAddress};

/// Which address candidate to take when the lookup returns several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidatePolicy {
    /// The lookup's own ranking.
    #[default]
    First,
    /// Prefer the candidate whose lot address contains the lot number written
    /// in the query ("역삼동 823-1"), else the first.
    BestLotMatch,
}

/// Lot number token of a query, e.g. "823-1" or "823" (a trailing "번지" is dropped).
fn lot_token(query: &str) -> Option<&str> {
    query
        .split_whitespace()
        .rev()
        .map(|t| t.trim_end_matches("번지"))
        .find(|t| is_lot_number(t))
}

fn is_lot_number(token: &str) -> bool {
    let mut parts = token.splitn(2, '-');
    let main = parts.next().unwrap_or_default();
    let sub_ok = parts
        .next()
        .is_none_or(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()));
    !main.is_empty() && main.bytes().all(|b| b.is_ascii_digit()) && sub_ok
}

/// Pick one candidate according to `policy`.
pub fn select_candidate<'a>(
    candidates: &'a [AddressCandidate],
    query: &str,
    policy: CandidatePolicy,
) -> Option<&'a AddressCandidate> {
    let first = candidates.first()?;
    if policy == CandidatePolicy::First {
        return Some(first);
    }
    let Some(token) = lot_token(query) else {
        return Some(first);
    };
    candidates
        .iter()
        .find(|c| {
            c.lot_address_text
                .split_whitespace()
                .any(|t| t.trim_end_matches("번지") == token)
        })
        .or(Some(first))
}

/// Turn the chosen candidate into a lot key.
pub fn resolve_candidate(
    query: &str,
    candidates: &[AddressCandidate],
    policy: CandidatePolicy,
) -> Result<ResolvedAddress, ResolveError> {
    let not_found = |reason: String| ResolveError::AddressNotFound {
        query: query.to_string(),
        reason,
    };

    let candidate = select_candidate(candidates, query, policy)
        .ok_or_else(|| not_found("address lookup returned no candidates".into()))?;

    let lot = LotKey::new(
        &candidate.administrative_code,
        candidate.main_lot_number,
        candidate.sub_lot_number,
    )
    .ok_or_else(|| {
        not_found(format!(
            "malformed administrative code {:?} or lot number {}-{}",
            candidate.administrative_code, candidate.main_lot_number, candidate.sub_lot_number
        ))
    })?;

    Ok(ResolvedAddress {
        lot,
        road_address_text: candidate.road_address_text.clone(),
        lot_address_text: candidate.lot_address_text.clone(),
    })
}
