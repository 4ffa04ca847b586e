use bytes::{Buf, BufMut, Bytes, BytesMut};

use slalink_core_types::{RequestUsage, UsageReportEntry};

use crate::CodecError;

/// Dense encoding of a checkpoint report.
///
/// Each entry is 12 bytes: `units_used` as a big-endian `u64` followed by
/// `elapsed_micros` as a big-endian `u32`. Entries are concatenated in
/// request order, so a batch of `n` entries is always `12 * n` bytes long.
#[derive(Copy, Clone, Debug, Default)]
pub struct UsageReportCodec;

impl UsageReportCodec {
    /// Normalises and encodes a batch of request usages.
    ///
    /// Rejected requests are billed as zero. Every entry is range-checked
    /// before anything is written, so an error never yields a partial report.
    pub fn encode_batch(&self, usages: &[RequestUsage]) -> Result<Bytes, CodecError> {
        let entries = usages
            .iter()
            .enumerate()
            .map(|(index, usage)| to_entry(index, usage.normalized()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.encode_entries(&entries))
    }

    /// Encodes entries that are already within range.
    pub fn encode_entries(&self, entries: &[UsageReportEntry]) -> Bytes {
        let mut buf = BytesMut::with_capacity(entries.len() * UsageReportEntry::ENCODED_LEN);

        for entry in entries {
            buf.put_u64(entry.units_used);
            buf.put_u32(entry.elapsed_micros);
        }

        buf.freeze()
    }

    /// Decodes a report that is expected to hold exactly `count` entries.
    pub fn decode_batch(
        &self,
        mut bytes: &[u8],
        count: usize,
    ) -> Result<Vec<UsageReportEntry>, CodecError> {
        let expected = count
            .checked_mul(UsageReportEntry::ENCODED_LEN)
            .ok_or(CodecError::MalformedReport {
                expected: usize::MAX,
                actual: bytes.len(),
            })?;

        if bytes.len() != expected {
            return Err(CodecError::MalformedReport {
                expected,
                actual: bytes.len(),
            });
        }

        let mut entries = Vec::with_capacity(count);
        while bytes.has_remaining() {
            let units_used = bytes.get_u64();
            let elapsed_micros = bytes.get_u32();
            entries.push(UsageReportEntry::new(units_used, elapsed_micros));
        }

        Ok(entries)
    }
}

fn to_entry(index: usize, usage: RequestUsage) -> Result<UsageReportEntry, CodecError> {
    let units_used = u64::try_from(usage.units_used).map_err(|_| CodecError::ValueOutOfRange {
        index,
        field: "units_used",
        value: usage.units_used,
        max: u64::MAX as u128,
    })?;

    let elapsed_micros =
        u32::try_from(usage.elapsed_micros).map_err(|_| CodecError::ValueOutOfRange {
            index,
            field: "elapsed_micros",
            value: usage.elapsed_micros as u128,
            max: u32::MAX as u128,
        })?;

    Ok(UsageReportEntry::new(units_used, elapsed_micros))
}
