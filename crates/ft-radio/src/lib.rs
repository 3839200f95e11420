//! `ft-radio`: per-tick radio link model between AGVs and base stations.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`params`]    | `RadioParams` (link budget constants)                      |
//! | [`budget`]    | path loss, `measure` → ranked `Signal`s, dBm ↔ watts       |
//! | [`selection`] | `select_serving` with handover hysteresis, `Selection`     |
//! | [`quality`]   | SINR, Shannon throughput, `JitterSource`                   |
//! | [`model`]     | `LinkModel::evaluate` → `LinkReport`                       |
//! | [`error`]     | `RadioError`                                               |
//!
//! # Model (summary)
//!
//! ```text
//! PL(d)    = PL0 + 10·n·log10(max(d, d0))        (+ shadow loss if obstructed)
//! RSRP     = P_tx − PL(d)
//! SINR     = 10·log10(S / (Σ I + N)),   N = N0 + 10·log10(B)
//! T (Mbps) = min(log2(1 + 10^(SINR/10)) · scale, cap) · jitter
//! ```
//!
//! This is a cosmetic link budget for visualisation, not a calibrated
//! propagation model.

pub mod budget;
pub mod error;
pub mod model;
pub mod params;
pub mod quality;
pub mod selection;


pub use budget::{dbm_to_watts, measure, path_loss_db, Signal, StationSite};
pub use error::{RadioError, RadioResult};
pub use model::{LinkModel, LinkReport};
pub use params::RadioParams;
pub use quality::{estimate_throughput, noise_watts, sinr_db, FixedJitter, JitterSource};
pub use selection::{select_serving, Selection};
