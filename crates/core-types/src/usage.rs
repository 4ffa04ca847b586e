/// Usage of a single request, as observed by the provider before it is
/// normalised into a report entry.
///
/// The widths are intentionally larger than the wire format so that
/// out-of-range values can be detected rather than truncated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestUsage {
    /// Whether the request was accepted and served.
    pub accepted: bool,
    /// Units of work consumed by the request.
    pub units_used: u128,
    /// Time spent serving the request, in microseconds.
    pub elapsed_micros: u64,
}

impl RequestUsage {
    /// An accepted request with the given usage.
    pub const fn accepted(units_used: u128, elapsed_micros: u64) -> Self {
        Self {
            accepted: true,
            units_used,
            elapsed_micros,
        }
    }

    /// A rejected request. Whatever usage was sampled for it is discarded
    /// when the request is normalised.
    pub const fn rejected(units_used: u128, elapsed_micros: u64) -> Self {
        Self {
            accepted: false,
            units_used,
            elapsed_micros,
        }
    }

    /// Applies the reporting rule that a rejected request is billed as zero
    /// units used in zero time. Accepted requests are returned unchanged.
    pub const fn normalized(self) -> Self {
        if self.accepted {
            self
        } else {
            Self {
                accepted: false,
                units_used: 0,
                elapsed_micros: 0,
            }
        }
    }
}

impl From<UsageReportEntry> for RequestUsage {
    fn from(entry: UsageReportEntry) -> Self {
        Self::accepted(entry.units_used as u128, entry.elapsed_micros as u64)
    }
}

/// One fixed-width entry of a checkpoint report.
///
/// The request id is implicit: it is the entry's position within its batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UsageReportEntry {
    /// Units of work billed for the request.
    pub units_used: u64,
    /// Time spent serving the request, in microseconds.
    pub elapsed_micros: u32,
}

impl UsageReportEntry {
    /// Size of an encoded entry in bytes.
    pub const ENCODED_LEN: usize = 8 + 4;

    /// Creates a new entry.
    pub const fn new(units_used: u64, elapsed_micros: u32) -> Self {
        Self {
            units_used,
            elapsed_micros,
        }
    }
}
