//! Serving-cell selection with handover hysteresis.

use ft_core::StationId;

use crate::Signal;

/// Outcome of a selection round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// No stations in range of the model at all.
    None,
    /// Keep the current serving station.
    Stay(StationId),
    /// First association, or the previous station no longer exists.
    Attach(StationId),
    Handover { from: StationId, to: StationId },
}

impl Selection {
    pub fn serving(self) -> Option<StationId> {
        match self {
            Selection::None => None,
            Selection::Stay(s) | Selection::Attach(s) => Some(s),
            Selection::Handover { to, .. } => Some(to),
        }
    }

    /// `true` if the association changed and should be recorded externally.
    pub fn is_change(self) -> bool {
        matches!(self, Selection::Attach(_) | Selection::Handover { .. })
    }
}

/// Pick the serving station from `signals` (strongest first).
///
/// The current station is kept unless the best station beats it by strictly
/// more than `margin_db`.  A `current` that is absent from `signals` is
/// treated as no association.
pub fn select_serving(current: Option<StationId>, signals: &[Signal], margin_db: f64) -> Selection {
    let Some(best) = signals.first() else {
        return Selection::None;
    };
    let serving = current.and_then(|id| signals.iter().find(|s| s.station == id));
    match serving {
        None => Selection::Attach(best.station),
        Some(cur) if best.station != cur.station && best.rsrp_dbm > cur.rsrp_dbm + margin_db => {
            Selection::Handover { from: cur.station, to: best.station }
        }
        Some(cur) => Selection::Stay(cur.station),
    }
}
