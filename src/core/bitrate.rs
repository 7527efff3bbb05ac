use tracing::{debug, info, warn};

use crate::error::AcquireError;
use crate::sources::MusicApi;

/// Supported bitrate tiers in kbps, best first.
pub const BITRATE_LADDER: [u32; 6] = [2000, 999, 740, 320, 192, 128];

/// A tier that produced a playable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub url: String,
    pub bitrate_kbps: u32,
}

/// Position to start probing from. The requested bitrate is a ceiling:
/// a value on the ladder starts there, anything else starts at the top.
pub fn start_index(requested_kbps: u32, ladder: &[u32]) -> usize {
    ladder
        .iter()
        .position(|&br| br == requested_kbps)
        .unwrap_or(0)
}

/// Tiers that will be probed for a request, in probe order.
pub fn candidate_tiers(requested_kbps: u32) -> &'static [u32] {
    &BITRATE_LADDER[start_index(requested_kbps, &BITRATE_LADDER)..]
}

/// Walks the ladder downward from the requested ceiling and stops at the first tier
/// with a non-empty URL. A failing probe only disqualifies its own tier.
pub fn negotiate(
    api: &dyn MusicApi,
    source: &str,
    track_id: &str,
    requested_kbps: u32,
) -> Result<Negotiated, AcquireError> {
    let tiers = candidate_tiers(requested_kbps);
    let mut errors = 0usize;

    for &br in tiers {
        debug!(source, track_id, br, "probing bitrate tier");
        match api.track_url(source, track_id, br) {
            Ok(Some(url)) => {
                info!(track_id, requested = requested_kbps, achieved = br, "bitrate negotiated");
                return Ok(Negotiated {
                    url,
                    bitrate_kbps: br,
                });
            }
            Ok(None) => debug!(br, "tier unavailable"),
            Err(e) => {
                errors += 1;
                warn!(br, error = %e, "tier probe failed");
            }
        }
    }

    // Transport failures and empty tiers are reported alike.
    if errors == tiers.len() {
        warn!(track_id, "every tier probe failed, upstream may be unreachable");
    }
    Err(AcquireError::NoPlayableSource)
}
