//! The AGV record and its task/status enums.

use std::fmt;

use ft_core::{AgvId, StationId, Vec3};

/// Link metrics reported while no station is serving.  Comes from the
/// radio configuration so records and link model agree.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkFloor {
    pub rsrp_dbm: f64,
    pub sinr_db:  f64,
}

// ── AgvTask ───────────────────────────────────────────────────────────────────

/// What the AGV is currently doing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgvTask {
    /// Freshly created, or no assignment yet.
    #[default]
    None,
    TransportingParts,
    MaterialSupply,
    WasteRemoval,
    ToolDelivery,
    AssemblyTransfer,
    /// Driving to, or stationed at, the charging pad.
    Charging,
    /// Sent to an explicit point by an operator; holds there on arrival.
    Directed,
}

impl AgvTask {
    /// Work tasks a dispatcher picks from at random.
    pub const WORK: [AgvTask; 5] = [
        AgvTask::TransportingParts,
        AgvTask::MaterialSupply,
        AgvTask::WasteRemoval,
        AgvTask::ToolDelivery,
        AgvTask::AssemblyTransfer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgvTask::None              => "None",
            AgvTask::TransportingParts => "Transporting Parts",
            AgvTask::MaterialSupply    => "Material Supply",
            AgvTask::WasteRemoval      => "Waste Removal",
            AgvTask::ToolDelivery      => "Tool Delivery",
            AgvTask::AssemblyTransfer  => "Assembly Transfer",
            AgvTask::Charging          => "Charging",
            AgvTask::Directed          => "Directed",
        }
    }

    #[inline]
    pub fn is_charging(self) -> bool {
        self == AgvTask::Charging
    }
}

impl fmt::Display for AgvTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── AgvStatus ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgvStatus {
    #[default]
    Idle,
    Moving,
}

impl fmt::Display for AgvStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgvStatus::Idle   => "Idle",
            AgvStatus::Moving => "Moving",
        })
    }
}

// ── Agv ───────────────────────────────────────────────────────────────────────

/// One automated guided vehicle.
///
/// Navigation fields are owned by the controller; the radio fields are
/// written by the link model once per tick and are a derived view.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agv {
    pub id:       AgvId,
    /// Display name, e.g. `AGV-1001`.
    pub label:    String,
    pub imei:     String,
    pub position: Vec3,
    /// Yaw in radians about `y`; see [`Vec3::yaw`].
    pub heading:  f64,
    /// Units per second.
    pub speed:    f64,
    /// Always within `[0, 100]`.
    pub battery:  f64,
    pub task:     AgvTask,
    pub status:   AgvStatus,

    // ── Navigation ────────────────────────────────────────────────────────
    pub target:     Option<Vec3>,
    /// Non-empty whenever `Some`.
    pub path:       Option<Vec<Vec3>>,
    /// Index of the waypoint being approached; always `< path.len()`.
    pub path_index: usize,
    /// Seconds the lookahead ray has been blocked without a break.
    pub stuck_secs: f64,
    /// Parked on the charging pad and replenishing.
    pub at_charger: bool,
    /// Bumped on every assignment.  Deferred retries carry the token they
    /// were scheduled with and are ignored once it no longer matches.
    pub assign_token: u64,

    // ── Radio (derived) ───────────────────────────────────────────────────
    pub connected_bs:    Option<StationId>,
    pub rsrp_dbm:        f64,
    pub sinr_db:         f64,
    pub throughput_mbps: f64,
}

impl Agv {
    /// A fresh, idle record with a full battery and no link.
    pub fn new(
        id:       AgvId,
        label:    String,
        imei:     String,
        position: Vec3,
        speed:    f64,
        floor:    LinkFloor,
    ) -> Self {
        Self {
            id,
            label,
            imei,
            position,
            heading: 0.0,
            speed,
            battery: 100.0,
            task: AgvTask::None,
            status: AgvStatus::Idle,
            target: None,
            path: None,
            path_index: 0,
            stuck_secs: 0.0,
            at_charger: false,
            assign_token: 0,
            connected_bs: None,
            rsrp_dbm: floor.rsrp_dbm,
            sinr_db: floor.sinr_db,
            throughput_mbps: 0.0,
        }
    }

    /// The waypoint currently being approached.
    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.path.as_ref().and_then(|p| p.get(self.path_index).copied())
    }

    /// Drop the path and target, leaving the AGV idle where it stands.
    pub fn clear_route(&mut self) {
        self.target = None;
        self.path = None;
        self.path_index = 0;
        self.stuck_secs = 0.0;
        self.status = AgvStatus::Idle;
    }
}
