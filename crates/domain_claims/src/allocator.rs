//! Identifier allocation
//!
//! Client and claim codes come from one counter per [`SequenceKind`]. The
//! counter is advanced by the store inside the write that consumes it, so
//! two concurrent writers can never observe the same value. The functions
//! here hold the store-independent parts: turning stored values back into
//! sequence numbers and computing the next client reference.
//!
//! A stored code that does not parse is a hard error. Falling back to a
//! restart at 1 would hand out codes that already exist.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{
    sanitize_client_name, AllocationError, ClaimCode, ClientCode, ClientId, ClientReference,
    PortError, SequenceKind,
};

/// Allocation primitives offered by a store while a write is open
///
/// Implementations hold whatever lock serializes allocation for the
/// duration of the enclosing write.
#[async_trait]
pub trait AllocationScope: Send {
    /// Advances and returns the counter for `kind`
    async fn next_sequence(&mut self, kind: SequenceKind) -> Result<u64, PortError>;

    /// Stored references of `client`'s claims for `name` on `day`
    async fn client_references(
        &mut self,
        client: ClientId,
        sanitized_name: &str,
        day: NaiveDate,
    ) -> Result<Vec<String>, PortError>;
}

/// Parses a stored identifier of `kind` into its sequence number
pub fn parse_sequence(kind: SequenceKind, value: &str) -> Result<u64, AllocationError> {
    match kind {
        SequenceKind::Client => ClientCode::parse(value).map(|c| c.sequence()),
        SequenceKind::Claim => ClaimCode::parse(value).map(|c| c.sequence()),
    }
}

/// Highest sequence number among stored values, 0 when there are none
pub fn max_sequence<'a, I>(kind: SequenceKind, values: I) -> Result<u64, AllocationError>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|value| parse_sequence(kind, value))
        .try_fold(0, |max, seq| seq.map(|s| max.max(s)))
}

/// Value following `current`, bounded by the rendering width of `kind`
pub fn next_after(kind: SequenceKind, current: u64) -> Result<u64, AllocationError> {
    let next = current + 1;
    if next > kind.max_value() {
        return Err(AllocationError::Exhausted {
            kind,
            max: kind.max_value(),
        });
    }
    Ok(next)
}

/// Middle number for the next reference of `sanitized_name` on `day`
///
/// Only references shaped `{sanitized_name}-{n}-{YYYYMMDD}` count; anything
/// else among `existing` is ignored.
pub fn next_reference_number<'a, I>(existing: I, sanitized_name: &str, day: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = ClientReference::name_prefix(sanitized_name);
    let suffix = ClientReference::date_suffix(day);
    existing
        .into_iter()
        .filter_map(|reference| {
            reference
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(suffix.as_str()))
                .and_then(|middle| middle.parse::<u32>().ok())
        })
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Builds the next reference for `client_name` from the stored ones
pub fn next_client_reference<'a, I>(client_name: &str, existing: I, day: NaiveDate) -> ClientReference
where
    I: IntoIterator<Item = &'a str>,
{
    let sanitized = sanitize_client_name(client_name);
    let number = next_reference_number(existing, &sanitized, day);
    ClientReference::new(sanitized, number, day)
}
