use tower_defence::combatant::CombatantId;
use tower_defence::geometry::{Ellipse, Rect, Vec2};
use tower_defence::projectile::*;

use approx::assert_relative_eq;

fn limits() -> FlightLimits {
    FlightLimits::for_arena(&Rect::new(0.0, 0.0, 400.0, 300.0), 50.0, 8.0)
}

fn shot(from: Vec2, to: Vec2) -> Projectile {
    Projectile::new(from, to, 100.0, 10, limits())
}

#[test]
fn new_projectile_is_active_single_impact() {
    let p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
    assert!(p.is_active());
    assert_eq!(p.impact, Impact::Ricochet { charges: 0 });
    assert_eq!(p.direction, Vec2::new(1.0, 0.0));
    assert_eq!(p.last_hit, None);
}

#[test]
fn advance_moves_along_direction() {
    let mut p = shot(Vec2::new(100.0, 100.0), Vec2::new(100.0, 200.0));
    p.advance(0.5);
    assert_relative_eq!(p.position.x, 100.0);
    assert_relative_eq!(p.position.y, 150.0);
    assert!(p.is_active());
}

#[test]
fn leaving_padded_bounds_deactivates() {
    let mut p = shot(Vec2::new(390.0, 100.0), Vec2::new(500.0, 100.0));
    p.advance(0.5); // x = 440, inside the 50 padding
    assert!(p.is_active());
    p.advance(0.5); // x = 490
    assert!(!p.is_active());
}

#[test]
fn zero_direction_projectile_times_out() {
    let at = Vec2::new(100.0, 100.0);
    let mut p = shot(at, at);
    assert_eq!(p.direction, Vec2::ZERO);
    for _ in 0..7 {
        p.advance(1.0);
    }
    assert!(p.is_active());
    assert_eq!(p.position, at);
    p.advance(1.0);
    assert!(!p.is_active());
}

#[test]
fn deactivation_is_permanent() {
    let mut p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
    p.register_hit(None);
    assert!(!p.is_active());
    let pos = p.position;
    p.advance(1.0);
    p.register_hit(None);
    assert!(!p.is_active());
    assert_eq!(p.position, pos);
}

#[test]
fn inactive_projectile_never_hits() {
    let target = Ellipse::circle(Vec2::new(0.0, 0.0), 10.0);
    let mut p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
    assert!(p.check_hit(&target));
    p.register_hit(None);
    assert!(!p.check_hit(&target));
}

#[test]
fn multi_hit_absorbs_several_impacts() {
    let mut p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).with_hits(3);
    p.register_hit(Some(CombatantId(1)));
    p.register_hit(Some(CombatantId(2)));
    assert!(p.is_active());
    assert_eq!(p.impact, Impact::MultiHit { hits_left: 1 });
    p.register_hit(Some(CombatantId(3)));
    assert!(!p.is_active());
}

#[test]
fn never_hits_the_same_combatant_twice_in_a_row() {
    let body = Ellipse::circle(Vec2::new(0.0, 0.0), 10.0);
    let mut p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).with_hits(2);
    assert!(p.check_hit_on(CombatantId(7), &body));
    p.register_hit(Some(CombatantId(7)));
    assert!(!p.check_hit_on(CombatantId(7), &body));
    assert!(p.check_hit_on(CombatantId(8), &body));
}

#[test]
fn ricochet_child_retargets_with_falloff() {
    let parent = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).with_ricochet(2);
    let child = parent
        .spawn_ricochet(CombatantId(4), Vec2::new(0.0, 40.0), 0.8)
        .unwrap();
    assert_eq!(child.damage, 8);
    assert_eq!(child.ricochet_charges(), 1);
    assert_eq!(child.last_hit, Some(CombatantId(4)));
    assert_eq!(child.position, parent.position);
    assert_relative_eq!(child.direction.y, 1.0);
    assert!(child.is_active());
}

#[test]
fn ricochet_damage_never_drops_below_one() {
    let parent = Projectile::new(Vec2::ZERO, Vec2::new(1.0, 0.0), 100.0, 1, limits()).with_ricochet(1);
    let child = parent.spawn_ricochet(CombatantId(0), Vec2::new(0.0, 1.0), 0.1).unwrap();
    assert_eq!(child.damage, 1);
}

#[test]
fn no_ricochet_without_charges() {
    let p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
    assert!(p.spawn_ricochet(CombatantId(0), Vec2::new(0.0, 1.0), 0.8).is_none());

    let enemy_shot = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).with_hits(1);
    assert!(enemy_shot.spawn_ricochet(CombatantId(0), Vec2::new(0.0, 1.0), 0.8).is_none());
}

#[test]
fn ricochet_parent_deactivates_on_hit() {
    let mut p = shot(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).with_ricochet(3);
    p.register_hit(Some(CombatantId(1)));
    assert!(!p.is_active());
}
