//! Integration tests for ft-sim.

use ft_core::{AgvId, SimRng, SimTime, StationId, Vec3};
use ft_mobility::{AgvStatus, AgvTask};
use ft_schedule::Generation;

use crate::{
    HandoverEvent, LayoutKind, NoopObserver, SimError, SimObserver, World, WorldBuilder,
    WorldConfig, WorldSnapshot,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 100 × 100 bare floor with `agvs` vehicles and no snapshots.
fn open_config(agvs: usize) -> WorldConfig {
    WorldConfig {
        factory_size:         100.0,
        agv_count:            agvs,
        layout:               LayoutKind::Open,
        snapshot_interval_ms: 0,
        seed:                 11,
        ..WorldConfig::default()
    }
}

/// One AGV at (40, 0, 40) and one station at the origin.
fn lone_agv_world() -> World {
    let mut world = WorldBuilder::new(open_config(1))
        .station_positions(vec![Vec3::ZERO])
        .spawn_points(vec![Vec3::new(40.0, 0.0, 40.0)])
        .build()
        .unwrap();
    world.resume();
    world
}

fn flat_distance(a: Vec3, b: Vec3) -> f64 {
    (a - b).flatten().length()
}

#[derive(Default)]
struct Recorder {
    ticks:     usize,
    handovers: Vec<HandoverEvent>,
    snapshots: Vec<WorldSnapshot>,
    resets:    Vec<Generation>,
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, _time: SimTime) {
        self.ticks += 1;
    }
    fn on_handover(&mut self, event: &HandoverEvent) {
        self.handovers.push(event.clone());
    }
    fn on_snapshot(&mut self, snapshot: &WorldSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
    fn on_reset(&mut self, generation: Generation) {
        self.resets.push(generation);
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_factory_floor() {
        let c = WorldConfig::default();
        assert_eq!(c.factory_size, 250.0);
        assert_eq!(c.cell_size, 2.5);
        assert_eq!(c.obstacle_count, 30);
        assert_eq!(c.agv_count, 10);
        assert_eq!(c.station_count, 4);
        assert_eq!(c.snapshot_interval_ms, 5_000);
        assert!(c.start_paused);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = WorldConfig::from_toml_str(
            r#"
            factory_size = 120.0
            agv_count = 3
            layout = "open"

            [radio]
            handover_margin_db = 6.0

            [motion]
            retry_delay_ms = [250, 1000]
            "#,
        )
        .unwrap();
        assert_eq!(c.factory_size, 120.0);
        assert_eq!(c.agv_count, 3);
        assert_eq!(c.layout, LayoutKind::Open);
        assert_eq!(c.radio.handover_margin_db, 6.0);
        assert_eq!(c.radio.tx_power_dbm, 23.0);
        assert_eq!(c.motion.retry_delay_ms, (250, 1000));
        assert_eq!(c.cell_size, 2.5);
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let err = WorldConfig::from_toml_str("factory_size = -5.0").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
        let err = WorldConfig::from_toml_str("cell_size = 0.0").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = WorldConfig::from_toml_str("factory_size = \"big\"").unwrap_err();
        assert!(matches!(err, SimError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 99\nobstacle_count = 5").unwrap();
        let c = WorldConfig::load(file.path()).unwrap();
        assert_eq!(c.seed, 99);
        assert_eq!(c.obstacle_count, 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorldConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod layout {
    use super::*;
    use crate::FactoryLayout;

    fn footprints_overlap(a: &ft_core::Aabb, b: &ft_core::Aabb) -> bool {
        a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.z <= b.max.z && a.max.z >= b.min.z
    }

    #[test]
    fn factory_has_walls_sites_and_charger() {
        let config = WorldConfig::default();
        let layout = FactoryLayout::generate(&config, &mut SimRng::new(1));
        assert_eq!(layout.walls.len(), 6);
        assert_eq!(layout.workstations.len(), 6);
        assert!(layout.charger.is_some());
        assert!(layout.obstacles.len() <= config.obstacle_count);
        assert_eq!(layout.collidable().len(), 6 + layout.obstacles.len());

        let sites = layout.sites();
        assert_eq!(sites.workstations.len(), 6);
        for ws in &sites.workstations {
            assert_eq!(ws.y, 0.0);
            assert!((ws.x - 100.0).abs() < 1e-9);
        }
        let charger = sites.charger.unwrap();
        assert!((charger.x + 100.0).abs() < 1e-9 && (charger.z - 100.0).abs() < 1e-9);
    }

    #[test]
    fn placed_bodies_never_overlap() {
        let config = WorldConfig { obstacle_count: 80, ..WorldConfig::default() };
        let layout = FactoryLayout::generate(&config, &mut SimRng::new(3));
        let mut placed = layout.workstations.clone();
        placed.extend(layout.charger);
        placed.extend(layout.obstacles.iter().copied());
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!footprints_overlap(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn obstacles_rest_on_floor_inside_margin() {
        let config = WorldConfig::default();
        let layout = FactoryLayout::generate(&config, &mut SimRng::new(5));
        let reach = config.factory_size / 2.0 - 5.0;
        for o in &layout.obstacles {
            assert_eq!(o.min.y, 0.0);
            assert!(o.max.y >= 1.0);
            let c = o.center();
            assert!(c.x.abs() <= reach + 1e-9 && c.z.abs() <= reach + 1e-9);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let config = WorldConfig::default();
        let a = FactoryLayout::generate(&config, &mut SimRng::new(8));
        let b = FactoryLayout::generate(&config, &mut SimRng::new(8));
        assert_eq!(a.obstacles, b.obstacles);
    }

    #[test]
    fn open_layout_is_empty() {
        let layout = FactoryLayout::generate(&open_config(1), &mut SimRng::new(1));
        assert!(layout.collidable().is_empty());
        assert!(layout.sites().workstations.is_empty());
        assert!(layout.sites().charger.is_none());
    }
}

// ── Stations ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stations {
    use super::*;
    use crate::station::{default_positions, place_stations, BANDS, VENDORS};

    #[test]
    fn first_four_on_quarter_grid() {
        let p = default_positions(4, 200.0);
        assert_eq!(p, vec![
            Vec3::new(-50.0, 0.0, -50.0),
            Vec3::new(50.0, 0.0, -50.0),
            Vec3::new(-50.0, 0.0, 50.0),
            Vec3::new(50.0, 0.0, 50.0),
        ]);
        assert_eq!(default_positions(2, 200.0).len(), 2);
        assert!(default_positions(0, 200.0).is_empty());
    }

    #[test]
    fn extra_stations_go_on_a_ring() {
        let p = default_positions(7, 200.0);
        assert_eq!(p.len(), 7);
        for extra in &p[4..] {
            assert!((extra.length() - 70.0).abs() < 1e-9);
        }
    }

    #[test]
    fn records_are_labelled_and_active() {
        let stations = place_stations(&default_positions(3, 100.0), &mut SimRng::new(2));
        assert_eq!(stations[0].label, "gNodeB-1");
        assert_eq!(stations[2].label, "gNodeB-3");
        for s in &stations {
            assert_eq!(s.status, "active");
            assert_eq!(s.height, 18.0);
            assert!(VENDORS.contains(&s.vendor.as_str()));
            assert!(BANDS.contains(&s.band.as_str()));
            assert_eq!(s.load(), 0);
        }
    }
}

// ── World construction ────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;

    #[test]
    fn default_factory_world_builds() {
        let world = World::new(WorldConfig::default()).unwrap();
        assert_eq!(world.agvs().len(), 10);
        assert_eq!(world.stations().len(), 4);
        assert!(world.is_paused());
        assert_eq!(world.generation(), Generation(0));
        assert_eq!(world.now(), SimTime::ZERO);
    }

    #[test]
    fn agv_records_follow_naming() {
        let world = World::new(WorldConfig::default()).unwrap();
        for (i, agv) in world.agvs().iter().enumerate() {
            assert_eq!(agv.label, format!("AGV-{}", 1001 + i));
            assert_eq!(agv.imei.len(), 15);
            assert!(agv.imei.starts_with("35824005"));
            assert!(agv.speed >= 3.0 && agv.speed < 5.0);
            assert_eq!(agv.battery, 100.0);
            assert_eq!(agv.rsrp_dbm, -140.0);
        }
    }

    #[test]
    fn agvs_spawn_inside_margin_and_get_work() {
        let config = WorldConfig::default();
        let bound = config.clamp_bound();
        let world = World::new(config).unwrap();
        for agv in world.agvs() {
            assert!(agv.position.x.abs() <= bound && agv.position.z.abs() <= bound);
            assert_ne!(agv.task, AgvTask::None);
            assert_eq!(agv.status, AgvStatus::Moving);
            let planned = agv.path.is_some();
            assert!(planned || world.wake_queue().contains(agv.id));
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorldConfig { cell_size: -1.0, ..WorldConfig::default() };
        assert!(World::new(config).is_err());
    }

    #[test]
    fn non_finite_station_position_is_rejected() {
        let result = WorldBuilder::new(open_config(1))
            .station_positions(vec![Vec3::new(f64::NAN, 0.0, 0.0)])
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn same_config_same_world() {
        let mut a = World::new(WorldConfig::default()).unwrap();
        let mut b = World::new(WorldConfig::default()).unwrap();
        a.resume();
        b.resume();
        for _ in 0..50 {
            a.tick(0.1, &mut NoopObserver);
            b.tick(0.1, &mut NoopObserver);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}

// ── Tick ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick {
    use super::*;

    #[test]
    fn paused_world_does_not_advance() {
        let mut world = World::new(open_config(2)).unwrap();
        let before = world.snapshot();
        let mut rec = Recorder::default();
        assert!(!world.tick(0.5, &mut rec));
        assert_eq!(world.now(), SimTime::ZERO);
        assert_eq!(world.snapshot(), before);
        assert_eq!(rec.ticks, 0);
    }

    #[test]
    fn degenerate_deltas_are_ignored() {
        let mut world = lone_agv_world();
        let before = world.snapshot();
        for dt in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(!world.tick(dt, &mut NoopObserver));
        }
        assert_eq!(world.snapshot(), before);
        assert_eq!(world.clock().ticks(), 0);
    }

    #[test]
    fn first_tick_attaches_to_only_station() {
        let mut world = lone_agv_world();
        let mut rec = Recorder::default();
        assert!(world.tick(0.1, &mut rec));

        let agv = &world.agvs()[0];
        assert_eq!(agv.connected_bs, Some(StationId(0)));
        assert!(agv.rsrp_dbm > -140.0);
        assert_eq!(rec.handovers.len(), 1);
        assert_eq!(rec.handovers[0].from, None);
        assert_eq!(rec.handovers[0].to, "gNodeB-1");
        assert_eq!(rec.handovers[0].agv_label, "AGV-1001");
        assert_eq!(world.stations()[0].connected_ues, vec![AgvId(0)]);

        world.tick(0.1, &mut rec);
        assert_eq!(rec.handovers.len(), 1);
    }

    #[test]
    fn no_stations_means_floor_link() {
        let mut world = WorldBuilder::new(open_config(2))
            .station_positions(vec![])
            .build()
            .unwrap();
        world.resume();
        world.tick(0.1, &mut NoopObserver);
        for agv in world.agvs() {
            assert_eq!(agv.connected_bs, None);
            assert_eq!(agv.rsrp_dbm, -140.0);
            assert_eq!(agv.sinr_db, -20.0);
            assert_eq!(agv.throughput_mbps, 0.0);
        }
        let stats = world.stats();
        assert_eq!(stats.connected_ues, 0);
        assert_eq!(stats.total_ues, 2);
        assert_eq!(stats.avg_rsrp_dbm, -140.0);
        assert_eq!(stats.avg_sinr_db, -20.0);
        assert_eq!(stats.total_throughput_mbps, 0.0);
    }

    #[test]
    fn configured_link_floor_is_reported_everywhere() {
        let mut config = open_config(2);
        config.radio.rsrp_floor_dbm = -130.0;
        config.radio.sinr_floor_db = -10.0;
        let mut world = WorldBuilder::new(config).station_positions(vec![]).build().unwrap();
        for agv in world.agvs() {
            assert_eq!((agv.rsrp_dbm, agv.sinr_db), (-130.0, -10.0));
        }

        world.resume();
        world.tick(0.1, &mut NoopObserver);
        for agv in world.agvs() {
            assert_eq!((agv.rsrp_dbm, agv.sinr_db), (-130.0, -10.0));
        }
        let stats = world.stats();
        assert_eq!(stats.avg_rsrp_dbm, -130.0);
        assert_eq!(stats.avg_sinr_db, -10.0);
    }

    #[test]
    fn stats_average_connected_agvs() {
        let mut world = World::new(open_config(3)).unwrap();
        world.resume();
        world.tick(0.1, &mut NoopObserver);
        let stats = world.stats();
        assert_eq!(stats.connected_ues, 3);
        let mean = world.agvs().iter().map(|a| a.rsrp_dbm).sum::<f64>() / 3.0;
        approx::assert_relative_eq!(stats.avg_rsrp_dbm, mean, epsilon = 1e-9);
        let load: usize = world.stations().iter().map(|s| s.load()).sum();
        assert_eq!(load, 3);
    }

    #[test]
    fn snapshots_follow_running_time() {
        let config = WorldConfig { snapshot_interval_ms: 1_000, ..open_config(2) };
        let mut world = World::new(config).unwrap();
        world.resume();
        let mut rec = Recorder::default();
        for _ in 0..10 {
            world.tick(0.25, &mut rec);
        }
        assert_eq!(rec.snapshots.len(), 2);
        assert_eq!(rec.snapshots[0].time, SimTime(1_000));
        assert_eq!(rec.snapshots[1].time, SimTime(2_000));
        assert_eq!(rec.snapshots[0].agvs.len(), 2);
        assert_eq!(rec.snapshots[0].stations.len(), 4);
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let mut world = World::new(open_config(1)).unwrap();
        world.resume();
        let mut rec = Recorder::default();
        for _ in 0..100 {
            world.tick(0.25, &mut rec);
        }
        assert!(rec.snapshots.is_empty());
    }

    #[test]
    fn battery_stays_in_range_on_factory_floor() {
        let mut world = World::new(WorldConfig::default()).unwrap();
        world.resume();
        let half = world.config().factory_size / 2.0;
        for _ in 0..300 {
            world.tick(0.1, &mut NoopObserver);
            for agv in world.agvs() {
                assert!((0.0..=100.0).contains(&agv.battery));
                assert!(agv.position.x.abs() <= half && agv.position.z.abs() <= half);
            }
        }
    }
}

// ── Commands and scheduling ───────────────────────────────────────────────────

#[cfg(test)]
mod commands {
    use super::*;

    #[test]
    fn commanded_agv_reaches_station_and_attaches() {
        let mut world = lone_agv_world();
        world.command_agv(AgvId(0), Vec3::ZERO).unwrap();
        assert_eq!(world.agvs()[0].status, AgvStatus::Moving);
        assert_eq!(world.agvs()[0].task, AgvTask::Directed);

        for _ in 0..2_000 {
            world.tick(0.1, &mut NoopObserver);
            if world.agvs()[0].status == AgvStatus::Idle {
                break;
            }
        }

        let agv = &world.agvs()[0];
        assert_eq!(agv.status, AgvStatus::Idle);
        assert!(flat_distance(agv.position, Vec3::ZERO) <= world.config().cell_size);
        assert_eq!(agv.connected_bs, Some(StationId(0)));
        assert_eq!(agv.task, AgvTask::Directed);
    }

    #[test]
    fn unknown_agv_is_an_error() {
        let mut world = lone_agv_world();
        let err = world.command_agv(AgvId(5), Vec3::ZERO).unwrap_err();
        assert!(matches!(err, SimError::UnknownAgv(AgvId(5))));
    }

    #[test]
    fn non_finite_target_is_rejected() {
        let mut world = lone_agv_world();
        let before = world.agvs()[0].target;
        for bad in [Vec3::new(f64::NAN, 0.0, 0.0), Vec3::new(0.0, 0.0, f64::INFINITY)] {
            let err = world.command_agv(AgvId(0), bad).unwrap_err();
            assert!(matches!(err, SimError::Config(_)));
        }
        assert_eq!(world.agvs()[0].target, before);
        assert_ne!(world.agvs()[0].task, AgvTask::Directed);
    }

    #[test]
    fn command_supersedes_pending_reassignment() {
        let mut world = lone_agv_world();
        // Drive the random first task to completion so an arrival wake is queued.
        for _ in 0..5_000 {
            world.tick(0.1, &mut NoopObserver);
            if !world.wake_queue().is_empty() {
                break;
            }
        }
        assert!(world.wake_queue().contains(AgvId(0)));

        world.command_agv(AgvId(0), Vec3::new(-30.0, 0.0, -30.0)).unwrap();
        // Past the longest arrival delay: the old wake fires and is ignored.
        for _ in 0..30 {
            world.tick(0.1, &mut NoopObserver);
        }
        assert!(world.wake_queue().is_empty());
        assert_eq!(world.agvs()[0].task, AgvTask::Directed);
    }
}

// ── Reset and parameter changes ───────────────────────────────────────────────

#[cfg(test)]
mod reset {
    use super::*;

    #[test]
    fn reset_starts_a_new_paused_generation() {
        let mut world = lone_agv_world();
        for _ in 0..20 {
            world.tick(0.1, &mut NoopObserver);
        }
        let mut rec = Recorder::default();
        world.reset(&mut rec).unwrap();

        assert_eq!(world.generation(), Generation(1));
        assert_eq!(rec.resets, vec![Generation(1)]);
        assert_eq!(world.now(), SimTime::ZERO);
        assert!(world.is_paused());
        let agv = &world.agvs()[0];
        assert_eq!(agv.battery, 100.0);
        assert_eq!(agv.connected_bs, None);
        assert!(flat_distance(agv.position, Vec3::new(40.0, 0.0, 40.0)) < 1e-9);
        assert_eq!(world.stations()[0].load(), 0);
    }

    #[test]
    fn reset_discards_pending_wakes() {
        let mut world = lone_agv_world();
        for _ in 0..5_000 {
            world.tick(0.1, &mut NoopObserver);
            if !world.wake_queue().is_empty() {
                break;
            }
        }
        assert!(!world.wake_queue().is_empty());
        world.reset(&mut NoopObserver).unwrap();
        // Open floor: every fresh assignment plans, so nothing is queued.
        assert!(world.wake_queue().is_empty());
    }

    #[test]
    fn set_config_rebuilds_with_new_density() {
        let mut world = World::new(open_config(2)).unwrap();
        let mut rec = Recorder::default();
        world.set_config(open_config(5), &mut rec).unwrap();
        assert_eq!(world.agvs().len(), 5);
        assert_eq!(rec.resets.len(), 1);
    }

    #[test]
    fn invalid_set_config_changes_nothing() {
        let mut world = World::new(open_config(2)).unwrap();
        let bad = WorldConfig { factory_size: 0.0, ..open_config(2) };
        assert!(world.set_config(bad, &mut NoopObserver).is_err());
        assert_eq!(world.generation(), Generation(0));
        assert_eq!(world.config().factory_size, 100.0);
    }

    #[test]
    fn shrinking_floor_confines_agvs() {
        let mut world = lone_agv_world();
        world.command_agv(AgvId(0), Vec3::new(-40.0, 0.0, -40.0)).unwrap();
        world.resize_floor(50.0).unwrap();

        let bound = world.config().clamp_bound();
        let agv = &world.agvs()[0];
        assert!(agv.position.x.abs() <= bound && agv.position.z.abs() <= bound);
        let target = agv.target.unwrap();
        assert!(target.x.abs() <= bound && target.z.abs() <= bound);
        assert_eq!(world.floor().bounds().width(), 50.0);
    }

    #[test]
    fn added_obstacle_blocks_grid() {
        let mut world = World::new(open_config(1)).unwrap();
        let body = ft_core::Aabb::on_floor(10.0, 10.0, 4.0, 3.0, 4.0);
        world.add_obstacle(body);
        assert_eq!(world.layout().obstacles.len(), 1);
        assert_eq!(world.floor().obstacles().len(), 1);
        assert!(!world.floor().grid().is_free_at(Vec3::new(10.0, 0.5, 10.0)));
    }
}
