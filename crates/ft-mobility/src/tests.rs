//! Unit tests for ft-mobility.

use ft_core::{AgentRng, AgvId, FloorBounds, Vec3};
use ft_spatial::FloorPlan;

use crate::{Agv, AgvController, AgvStatus, AgvTask, Directive, LinkFloor, Sites};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Open 100 × 100 floor, 2.5-unit cells, no obstacles.
fn open_floor() -> FloorPlan {
    FloorPlan::new(FloorBounds::centered(100.0), 2.5, vec![]).unwrap()
}

const FLOOR: LinkFloor = LinkFloor { rsrp_dbm: -140.0, sinr_db: -20.0 };

fn agv_at(x: f64, z: f64) -> Agv {
    Agv::new(AgvId(0), "AGV-1001".into(), "358240050000000".into(), Vec3::new(x, 0.5, z), 3.0, FLOOR)
}

fn rng() -> AgentRng {
    AgentRng::new(7, AgvId(0), 0)
}

fn flat_distance(a: Vec3, b: Vec3) -> f64 {
    (a - b).flatten().length()
}

/// Tick until the AGV stops moving or `max_ticks` run out.  Returns the
/// directive from the last tick.
fn drive(
    ctl:   &AgvController,
    agv:   &mut Agv,
    floor: &mut FloorPlan,
    sites: &Sites,
    rng:   &mut AgentRng,
    max_ticks: usize,
) -> Directive {
    let mut last = Directive::None;
    for _ in 0..max_ticks {
        last = ctl.update(agv, floor, sites, rng, 0.1);
        if agv.status == AgvStatus::Idle {
            break;
        }
    }
    last
}

// ── Records ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod records {
    use super::*;
    use crate::MotionParams;

    #[test]
    fn new_agv_starts_idle_with_floor_link() {
        let a = agv_at(0.0, 0.0);
        assert_eq!(a.status, AgvStatus::Idle);
        assert_eq!(a.task, AgvTask::None);
        assert_eq!(a.battery, 100.0);
        assert_eq!(a.rsrp_dbm, -140.0);
        assert_eq!(a.sinr_db, -20.0);
        assert_eq!(a.throughput_mbps, 0.0);
        assert!(a.current_waypoint().is_none());
    }

    #[test]
    fn task_labels() {
        assert_eq!(AgvTask::TransportingParts.to_string(), "Transporting Parts");
        assert_eq!(AgvTask::Charging.label(), "Charging");
        assert!(!AgvTask::WORK.contains(&AgvTask::Charging));
        assert_eq!(AgvStatus::Moving.to_string(), "Moving");
    }

    #[test]
    fn default_params_are_valid() {
        assert!(MotionParams::default().validate().is_ok());
    }

    #[test]
    fn inverted_delay_range_is_rejected() {
        let p = MotionParams { retry_delay_ms: (2_000, 500), ..MotionParams::default() };
        assert!(p.validate().is_err());
        let p = MotionParams { lookahead_cells: 0.0, ..MotionParams::default() };
        assert!(p.validate().is_err());
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assignment {
    use super::*;
    use ft_core::Aabb;

    #[test]
    fn assign_to_workstation_plans_a_route() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = Sites { workstations: vec![Vec3::new(20.0, 0.0, 0.0)], charger: None };
        let mut a = agv_at(-20.0, 0.0);

        let d = ctl.assign_task(&mut a, &mut floor, &sites, &mut rng());
        assert_eq!(d, Directive::None);
        assert_eq!(a.status, AgvStatus::Moving);
        assert!(AgvTask::WORK.contains(&a.task));
        assert_eq!(a.assign_token, 1);
        let path = a.path.as_ref().unwrap();
        assert!(!path.is_empty());
        // The route ends exactly on the (ride-height) target.
        assert_eq!(*path.last().unwrap(), Vec3::new(20.0, 0.5, 0.0));
        assert_eq!(a.target, Some(Vec3::new(20.0, 0.5, 0.0)));
    }

    #[test]
    fn low_battery_goes_to_charger() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = Sites {
            workstations: vec![Vec3::new(20.0, 0.0, 0.0)],
            charger:      Some(Vec3::new(-30.0, 0.0, 30.0)),
        };
        let mut a = agv_at(0.0, 0.0);
        a.battery = 19.0;
        ctl.assign_task(&mut a, &mut floor, &sites, &mut rng());
        assert_eq!(a.task, AgvTask::Charging);
        assert_eq!(a.target, Some(Vec3::new(-30.0, 0.5, 30.0)));
    }

    #[test]
    fn low_battery_without_charger_keeps_working() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = Sites { workstations: vec![Vec3::new(20.0, 0.0, 0.0)], charger: None };
        let mut a = agv_at(0.0, 0.0);
        a.battery = 5.0;
        ctl.assign_task(&mut a, &mut floor, &sites, &mut rng());
        assert!(AgvTask::WORK.contains(&a.task));
    }

    #[test]
    fn no_workstations_means_random_point_inside_bounds() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut r = rng();
        for _ in 0..20 {
            let mut a = agv_at(0.0, 0.0);
            ctl.assign_task(&mut a, &mut floor, &Sites::default(), &mut r);
            let t = a.target.unwrap();
            assert!(t.x.abs() <= 48.0 && t.z.abs() <= 48.0, "target {t} outside bounds");
        }
    }

    #[test]
    fn targets_are_clamped_inside_the_floor() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        ctl.direct(&mut a, Vec3::new(500.0, 0.0, -500.0), &mut floor, &mut rng());
        assert_eq!(a.target, Some(Vec3::new(48.0, 0.5, -48.0)));
    }

    #[test]
    fn unreachable_target_schedules_a_retry() {
        let ctl = AgvController::default();
        // A solid block much wider than the snap radius around the target.
        let mut floor = FloorPlan::new(
            FloorBounds::centered(100.0),
            2.5,
            vec![Aabb::on_floor(20.0, 20.0, 30.0, 2.0, 30.0)],
        )
        .unwrap();
        let mut a = agv_at(-30.0, -30.0);
        let d = ctl.direct(&mut a, Vec3::new(20.0, 0.0, 20.0), &mut floor, &mut rng());
        match d {
            Directive::AssignAfter { delay_ms } => assert!((500..=2_000).contains(&delay_ms)),
            other => panic!("expected a retry, got {other:?}"),
        }
        assert!(a.path.is_none());
        assert!(a.target.is_some());

        // Stalled: ticking neither moves it nor panics.
        let before = a.position;
        ctl.update(&mut a, &mut floor, &Sites::default(), &mut rng(), 0.5);
        assert_eq!(a.position, before);
    }

    #[test]
    fn every_assignment_bumps_the_token() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        let mut r = rng();
        ctl.assign_task(&mut a, &mut floor, &Sites::default(), &mut r);
        ctl.direct(&mut a, Vec3::new(10.0, 0.0, 10.0), &mut floor, &mut r);
        assert_eq!(a.assign_token, 2);
    }
}

// ── Path following ────────────────────────────────────────────────────────────

#[cfg(test)]
mod following {
    use super::*;
    use ft_core::Aabb;

    #[test]
    fn work_task_arrives_then_waits_for_next_assignment() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = Sites { workstations: vec![Vec3::new(20.0, 0.0, 0.0)], charger: None };
        let mut a = agv_at(-20.0, 0.0);
        let mut r = rng();
        ctl.assign_task(&mut a, &mut floor, &sites, &mut r);

        let d = drive(&ctl, &mut a, &mut floor, &sites, &mut r, 2_000);
        assert_eq!(a.status, AgvStatus::Idle);
        assert!(a.path.is_none() && a.target.is_none());
        assert!(flat_distance(a.position, Vec3::new(20.0, 0.0, 0.0)) < 1.5);
        match d {
            Directive::AssignAfter { delay_ms } => assert!((800..=2_000).contains(&delay_ms)),
            other => panic!("expected a post-arrival delay, got {other:?}"),
        }
    }

    #[test]
    fn directed_task_holds_on_arrival() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(40.0, 40.0);
        let mut r = rng();
        ctl.direct(&mut a, Vec3::ZERO, &mut floor, &mut r);
        let d = drive(&ctl, &mut a, &mut floor, &Sites::default(), &mut r, 2_000);
        assert_eq!(d, Directive::None);
        assert_eq!(a.status, AgvStatus::Idle);
        assert!(flat_distance(a.position, Vec3::ZERO) < 2.5);
    }

    #[test]
    fn heading_faces_travel_direction() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        let mut r = rng();
        ctl.direct(&mut a, Vec3::new(0.0, 0.0, 30.0), &mut floor, &mut r);
        for _ in 0..20 {
            ctl.update(&mut a, &mut floor, &Sites::default(), &mut r, 0.1);
        }
        // Travelling toward +z: yaw ≈ 0.
        assert!(a.heading.abs() < 0.6, "heading {}", a.heading);
        assert!(a.position.z > 1.0);
    }

    #[test]
    fn non_positive_delta_is_a_no_op() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        let mut r = rng();
        ctl.direct(&mut a, Vec3::new(30.0, 0.0, 0.0), &mut floor, &mut r);
        let (pos, battery) = (a.position, a.battery);
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(ctl.update(&mut a, &mut floor, &Sites::default(), &mut r, dt), Directive::None);
        }
        assert_eq!(a.position, pos);
        assert_eq!(a.battery, battery);
    }

    #[test]
    fn blocked_route_is_replanned_around_new_obstacle() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(-20.0, 0.0);
        let mut r = rng();
        let goal = Vec3::new(20.0, 0.0, 0.0);
        ctl.direct(&mut a, goal, &mut floor, &mut r);
        let first_path = a.path.clone().unwrap();

        // Drop a wall across the planned straight line.
        floor.add_obstacle(Aabb::on_floor(-15.0, 0.0, 2.0, 2.0, 20.0));

        let mut replanned = false;
        for _ in 0..3_000 {
            ctl.update(&mut a, &mut floor, &Sites::default(), &mut r, 0.1);
            if a.path.as_ref().is_some_and(|p| *p != first_path) {
                replanned = true;
            }
            if a.status == AgvStatus::Idle {
                break;
            }
        }
        assert!(replanned, "the AGV never replanned");
        assert_eq!(a.status, AgvStatus::Idle);
        assert_eq!(a.task, AgvTask::Directed);
        assert!(flat_distance(a.position, goal) < 1.5);
    }

    #[test]
    fn failed_replan_reassigns_immediately() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = Sites { workstations: vec![Vec3::new(-30.0, 0.0, -30.0)], charger: None };
        let mut a = agv_at(-20.0, 0.0);
        let mut r = rng();
        let goal = Vec3::new(20.0, 0.0, 0.0);
        ctl.direct(&mut a, goal, &mut floor, &mut r);
        let token = a.assign_token;

        // Bury the goal deeper than the snap radius reaches.
        floor.add_obstacle(Aabb::on_floor(20.0, 0.0, 24.0, 2.0, 24.0));

        let mut outcome = None;
        for _ in 0..3_000 {
            let d = ctl.update(&mut a, &mut floor, &sites, &mut r, 0.1);
            if a.task != AgvTask::Directed {
                outcome = Some(d);
                break;
            }
        }
        assert_eq!(outcome, Some(Directive::None), "task never left Directed");
        assert!(AgvTask::WORK.contains(&a.task));
        assert_eq!(a.status, AgvStatus::Moving);
        assert!(a.path.is_some());
        assert_eq!(a.target.map(|t| flat_distance(t, Vec3::new(-30.0, 0.0, -30.0)) < 1e-9), Some(true));
        assert!(a.assign_token > token);
    }

    #[test]
    fn position_is_clamped_inside_bounds() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        ctl.direct(&mut a, Vec3::new(47.0, 0.0, 0.0), &mut floor, &mut rng());
        a.position = Vec3::new(49.5, 0.5, 0.0);
        ctl.update(&mut a, &mut floor, &Sites::default(), &mut rng(), 0.1);
        assert!(a.position.x <= 48.0);
    }

    #[test]
    fn confine_pulls_agv_and_target_inside() {
        let ctl = AgvController::default();
        let mut a = agv_at(45.0, -45.0);
        a.target = Some(Vec3::new(40.0, 0.5, 40.0));
        assert!(ctl.confine(&mut a, FloorBounds::centered(50.0)));
        assert_eq!(a.position, Vec3::new(23.0, 0.5, -23.0));
        assert_eq!(a.target, Some(Vec3::new(23.0, 0.5, 23.0)));
        assert!(!ctl.confine(&mut a, FloorBounds::centered(50.0)));
    }
}

// ── Battery ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod battery {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn charger_sites() -> Sites {
        Sites {
            workstations: vec![Vec3::new(20.0, 0.0, -20.0)],
            charger:      Some(Vec3::new(-10.0, 0.0, 10.0)),
        }
    }

    #[test]
    fn work_drains_at_fixed_rate() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        ctl.direct(&mut a, Vec3::new(40.0, 0.0, 0.0), &mut floor, &mut rng());
        ctl.update(&mut a, &mut floor, &Sites::default(), &mut rng(), 2.0);
        assert_relative_eq!(a.battery, 99.8, epsilon = 1e-9);
    }

    #[test]
    fn idle_agv_still_drains() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        ctl.update(&mut a, &mut floor, &Sites::default(), &mut rng(), 10.0);
        assert_relative_eq!(a.battery, 99.0, epsilon = 1e-9);
    }

    #[test]
    fn charging_run_charges_at_the_pad_then_reassigns() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let sites = charger_sites();
        let mut a = agv_at(10.0, -10.0);
        a.battery = 12.0;
        let mut r = rng();
        ctl.assign_task(&mut a, &mut floor, &sites, &mut r);
        assert_eq!(a.task, AgvTask::Charging);

        // Approach: battery is held, never drained.
        drive(&ctl, &mut a, &mut floor, &sites, &mut r, 2_000);
        assert!(a.at_charger);
        assert_relative_eq!(a.battery, 12.0, epsilon = 1e-9);

        // Parked: 10 %/s.
        ctl.update(&mut a, &mut floor, &sites, &mut r, 1.0);
        assert_relative_eq!(a.battery, 22.0, epsilon = 1e-9);

        for _ in 0..20 {
            if !a.at_charger {
                break;
            }
            ctl.update(&mut a, &mut floor, &sites, &mut r, 1.0);
        }
        assert_eq!(a.battery, 100.0);
        assert!(!a.at_charger);
        assert!(AgvTask::WORK.contains(&a.task), "expected new work, got {}", a.task);
        assert_eq!(a.status, AgvStatus::Moving);
    }

    #[test]
    fn empty_battery_stays_at_zero() {
        let ctl = AgvController::default();
        let mut floor = open_floor();
        let mut a = agv_at(0.0, 0.0);
        a.battery = 0.05;
        ctl.update(&mut a, &mut floor, &Sites::default(), &mut rng(), 5.0);
        assert_eq!(a.battery, 0.0);
    }

    proptest! {
        #[test]
        fn battery_stays_in_range_and_charging_never_drains(
            start in 0.0f64..100.0,
            dts in proptest::collection::vec(-0.5f64..3.0, 1..200),
        ) {
            let ctl = AgvController::default();
            let mut floor = open_floor();
            let sites = charger_sites();
            let mut a = agv_at(-5.0, 5.0);
            a.battery = start;
            let mut r = rng();
            ctl.assign_task(&mut a, &mut floor, &sites, &mut r);

            for dt in dts {
                let (was_charging, before) = (a.task.is_charging(), a.battery);
                ctl.update(&mut a, &mut floor, &sites, &mut r, dt);
                prop_assert!((0.0..=100.0).contains(&a.battery), "battery {}", a.battery);
                if was_charging {
                    prop_assert!(a.battery >= before, "charging AGV lost charge: {} -> {}", before, a.battery);
                }
            }
        }
    }
}
