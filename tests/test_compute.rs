use tower_defence::combatant::*;
use tower_defence::compute::*;
use tower_defence::config::GameConfig;
use tower_defence::director::{build_combatant, SpawnKind};
use tower_defence::entities::*;
use tower_defence::geometry::Vec2;
use tower_defence::projectile::Projectile;
use tower_defence::upgrade::{card_rects, offer, UpgradeKind};

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A match where nothing spawns and the tower holds fire, so a test only
/// sees the combatants and projectiles it places itself.
fn quiet_state() -> MatchState {
    let mut s = init_state(GameConfig::default(), 0);
    s.wave.required = 1;
    s.wave.spawned = 1;
    s.tower.attack_cooldown = 100.0;
    s
}

fn spawn(state: &MatchState, id: u64, kind: SpawnKind, offset: Vec2) -> Combatant {
    build_combatant(
        CombatantId(id),
        kind,
        state.tower.center() + offset,
        state.wave.wave,
        &state.config,
        &state.difficulty,
        state.limits,
    )
}

fn menu_state() -> MatchState {
    let mut s = quiet_state();
    s.status = GameStatus::UpgradeMenu;
    s.upgrades = offer(&s.config.upgrades);
    s.selected_upgrade = 0;
    s
}

fn key(k: Key) -> InputEvent {
    InputEvent::KeyDown(k)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_centres_tower_in_arena() {
    let s = init_state(GameConfig::default(), 7);
    assert_eq!(s.tower.center(), Vec2::new(423.0, 250.0));
    assert_eq!(s.tower.health, 100);
    assert_eq!(s.wave.wave, 1);
    assert_eq!(s.wave.required, 5);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.high_score, 7);
    assert_eq!(s.total_kills, 0);
    assert!(s.combatants.is_empty());
    assert!(s.stray_projectiles.is_empty());
    assert!(s.upgrades.is_empty());
}

#[test]
fn projectile_bounds_pad_the_arena() {
    let s = init_state(GameConfig::default(), 0);
    assert_relative_eq!(s.limits.bounds.left, -50.0);
    assert_relative_eq!(s.limits.bounds.width, 946.0);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_does_not_mutate_input() {
    let s = init_state(GameConfig::default(), 0);
    let before = s.clone();
    let _ = tick(&s, 2.0, &mut seeded_rng());
    assert_eq!(s, before);
}

#[test]
fn negative_dt_is_treated_as_zero() {
    let s = init_state(GameConfig::default(), 0);
    assert_eq!(tick(&s, -1.0, &mut seeded_rng()), s);
}

#[test]
fn first_spawn_arrives_after_the_interval() {
    let mut rng = seeded_rng();
    let s = init_state(GameConfig::default(), 0);
    let s = tick(&s, 1.0, &mut rng);
    assert!(s.combatants.is_empty());
    let s = tick(&s, 1.0, &mut rng);
    assert_eq!(s.combatants.len(), 1);
    assert_eq!(s.wave.spawned, 1);
}

#[test]
fn menus_freeze_the_simulation() {
    let mut s = quiet_state();
    let melee = spawn(&s, 1, SpawnKind::Melee, Vec2::new(200.0, 0.0));
    s.combatants.push(melee);

    s.status = GameStatus::UpgradeMenu;
    assert_eq!(tick(&s, 1.0, &mut seeded_rng()), s);
    s.status = GameStatus::GameOver;
    assert_eq!(tick(&s, 1.0, &mut seeded_rng()), s);
}

#[test]
fn melee_contact_damage_is_cooldown_gated() {
    let mut rng = seeded_rng();
    let mut s = quiet_state();
    let melee = spawn(&s, 1, SpawnKind::Melee, Vec2::new(35.0, 0.0));
    s.combatants.push(melee);

    let s = tick(&s, 0.1, &mut rng);
    assert_eq!(s.tower.health, 95);
    let s = tick(&s, 0.1, &mut rng);
    assert_eq!(s.tower.health, 95);
    assert_eq!(s.combatants.len(), 1);
}

/// Tower at range 150, damage 10, one shot per second; a melee combatant
/// starts 200 away and walks in at 50 units/s.
fn approach_state() -> MatchState {
    let mut s = init_state(GameConfig::default(), 0);
    s.wave.required = 1;
    s.wave.spawned = 1;
    s.tower.damage = 10.0;
    let mut melee = spawn(&s, 1, SpawnKind::Melee, Vec2::new(200.0, 0.0));
    melee.locomotion.speed = 50.0;
    melee.health = 30;
    melee.max_health = 30;
    s.combatants.push(melee);
    s
}

#[test]
fn tower_fires_the_frame_the_approaching_melee_enters_range() {
    let mut rng = seeded_rng();
    let mut s = approach_state();

    for _ in 0..3 {
        s = tick(&s, 0.25, &mut rng);
    }
    assert!(s.tower.projectiles.is_empty());

    // t = 1.0: cooldown has just run out and the combatant is exactly 150 away.
    s = tick(&s, 0.25, &mut rng);
    assert_relative_eq!(s.combatants[0].distance_to(s.tower.center()), 150.0);
    assert_eq!(s.tower.projectiles.len(), 1);
    assert_relative_eq!(s.tower.attack_cooldown, 1.0);

    for _ in 0..15 {
        s = tick(&s, 0.05, &mut rng);
    }
    assert_eq!(s.combatants[0].health, 20);
    assert!(s.tower.projectiles.is_empty());
}

#[test]
fn one_long_frame_still_fires_on_arrival_in_range() {
    let mut rng = seeded_rng();
    let s = tick(&approach_state(), 1.0, &mut rng);
    assert_relative_eq!(s.combatants[0].distance_to(s.tower.center()), 150.0);
    assert_eq!(s.tower.projectiles.len(), 1);
}

#[test]
fn ricochet_chains_to_the_only_other_combatant() {
    let mut s = quiet_state();
    let a = spawn(&s, 1, SpawnKind::Melee, Vec2::new(100.0, 0.0));
    let b = spawn(&s, 2, SpawnKind::Melee, Vec2::new(100.0, 40.0));
    let aim = a.center();
    s.tower.projectiles.push(
        Projectile::new(aim - Vec2::new(3.0, 0.0), aim, 300.0, 10, s.limits).with_ricochet(1),
    );
    s.combatants.push(a);
    s.combatants.push(b);

    let s = tick(&s, 0.01, &mut seeded_rng());

    assert_eq!(s.total_kills, 1);
    assert_eq!(s.wave.killed, 1);
    assert_eq!(s.combatants.len(), 1);
    assert_eq!(s.combatants[0].id, CombatantId(2));

    assert_eq!(s.tower.projectiles.len(), 1);
    let child = &s.tower.projectiles[0];
    assert_eq!(child.damage, 8);
    assert_eq!(child.ricochet_charges(), 0);
    assert_eq!(child.last_hit, Some(CombatantId(1)));
    let to_b = (s.combatants[0].center() - child.position).normalized();
    assert!(child.direction.dot(to_b) > 0.99);

    // Killed == required but B is still alive: the wave is not over.
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn ricochet_target_excludes_the_victim_and_respects_range() {
    let s = quiet_state();
    let combatants = vec![
        spawn(&s, 1, SpawnKind::Melee, Vec2::new(0.0, 100.0)),
        spawn(&s, 2, SpawnKind::Melee, Vec2::new(0.0, -100.0)),
        spawn(&s, 3, SpawnKind::Melee, Vec2::new(0.0, 130.0)),
    ];
    let impact = s.tower.center() + Vec2::new(0.0, 100.0);

    // Nearest other than #1 is #3, 30 away.
    assert_eq!(find_ricochet_target(&combatants, impact, CombatantId(1), 150.0), Some(2));
    // #2 is 200 away, outside the reach.
    assert_eq!(find_ricochet_target(&combatants[..2], impact, CombatantId(1), 150.0), None);
    // Never the victim itself, even when it is the only one close by.
    assert_eq!(find_ricochet_target(&combatants[..1], impact, CombatantId(1), 150.0), None);
}

#[test]
fn a_shot_damages_only_one_combatant() {
    let mut s = quiet_state();
    let mut a = spawn(&s, 1, SpawnKind::Melee, Vec2::new(100.0, 0.0));
    let mut b = spawn(&s, 2, SpawnKind::Melee, Vec2::new(100.0, 0.0));
    a.health = 30;
    a.max_health = 30;
    b.health = 30;
    b.max_health = 30;
    let aim = a.center();
    s.tower.projectiles.push(Projectile::new(aim - Vec2::new(3.0, 0.0), aim, 300.0, 10, s.limits));
    s.combatants.push(a);
    s.combatants.push(b);

    let s = tick(&s, 0.01, &mut seeded_rng());
    let lost: i32 = s.combatants.iter().map(|c| c.max_health - c.health).sum();
    assert_eq!(lost, 10);
    assert!(s.tower.projectiles.is_empty());
}

#[test]
fn dead_shooters_leave_stray_projectiles() {
    let mut s = quiet_state();
    // Keep the wave open after this kill.
    s.wave.required = 2;
    s.wave.spawned = 2;
    let center = s.tower.center();
    let mut ranged = spawn(&s, 1, SpawnKind::Ranged, Vec2::new(100.0, 0.0));
    if let CombatantKind::Ranged(r) = &mut ranged.kind {
        r.attack_timer = 100.0;
    }
    ranged
        .projectiles
        .push(Projectile::new(center + Vec2::new(0.0, 200.0), center, 200.0, 5, s.limits).with_hits(1));
    let aim = ranged.center();
    s.tower.projectiles.push(Projectile::new(aim - Vec2::new(3.0, 0.0), aim, 300.0, 10, s.limits));
    s.combatants.push(ranged);

    let mut rng = seeded_rng();
    let s = tick(&s, 0.01, &mut rng);
    assert!(s.combatants.is_empty());
    assert_eq!(s.stray_projectiles.len(), 1);

    // The orphaned shot still reaches the tower.
    let mut s = s;
    for _ in 0..20 {
        s = tick(&s, 0.05, &mut rng);
    }
    assert!(s.stray_projectiles.is_empty());
    assert_eq!(s.tower.health, 95);
}

#[test]
fn tower_destroyed_means_game_over() {
    let mut s = quiet_state();
    s.high_score = 0;
    s.tower.health = 3;
    let center = s.tower.center();
    s.stray_projectiles
        .push(Projectile::new(center, center + Vec2::new(1.0, 0.0), 10.0, 5, s.limits).with_hits(1));

    let s = tick(&s, 0.01, &mut seeded_rng());
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(s.tower.health, 0);
    assert_eq!(s.high_score, 1);
}

#[test]
fn high_score_never_decreases() {
    let mut s = quiet_state();
    s.high_score = 10;
    s.tower.health = 1;
    let center = s.tower.center();
    s.stray_projectiles
        .push(Projectile::new(center, center + Vec2::new(1.0, 0.0), 10.0, 5, s.limits).with_hits(1));

    let s = tick(&s, 0.01, &mut seeded_rng());
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(s.high_score, 10);
}

#[test]
fn cleared_wave_heals_and_opens_the_upgrade_menu() {
    let mut s = quiet_state();
    s.wave.killed = s.wave.required;
    s.tower.health = 50;

    let s = tick(&s, 0.1, &mut seeded_rng());
    assert_eq!(s.status, GameStatus::UpgradeMenu);
    assert_eq!(s.tower.health, 70);
    assert_eq!(s.upgrades.len(), 5);
    assert_eq!(s.selected_upgrade, 0);
    assert_eq!(s.high_score, 1);
}

// ── Upgrade menu ──────────────────────────────────────────────────────────────

#[test]
fn confirm_applies_card_and_starts_next_wave() {
    let s = confirm_upgrade(&menu_state());
    assert_relative_eq!(s.tower.damage, 7.0);
    assert_eq!(s.wave.wave, 2);
    assert_eq!(s.wave.required, 7);
    assert_eq!(s.wave.killed, 0);
    assert_eq!(s.status, GameStatus::Playing);
    assert!(s.upgrades.is_empty());
}

#[test]
fn confirm_outside_menu_does_nothing() {
    let s = quiet_state();
    assert_eq!(confirm_upgrade(&s), s);
}

#[test]
fn confirm_after_boss_wave_ratchets_difficulty() {
    let mut s = menu_state();
    s.wave.wave = 5;
    let s = confirm_upgrade(&s);
    assert_eq!(s.wave.wave, 6);
    assert_relative_eq!(s.difficulty.damage_multiplier, 1.2);
    assert_relative_eq!(s.difficulty.attack_speed_multiplier, 1.15);
}

#[test]
fn selection_wraps_both_ways() {
    let s = menu_state();
    let s = select_previous_upgrade(&s);
    assert_eq!(s.selected_upgrade, 4);
    let s = select_next_upgrade(&s);
    assert_eq!(s.selected_upgrade, 0);
    assert_eq!(select_upgrade(&s, 9).selected_upgrade, 0);
}

#[test]
fn keyboard_drives_the_menu() {
    let s = menu_state();
    let s = handle_input(&s, &key(Key::Right));
    assert_eq!(s.selected_upgrade, 1);
    let s = handle_input(&s, &key(Key::Left));
    assert_eq!(s.selected_upgrade, 0);
    let s = handle_input(&s, &key(Key::Char('3')));
    assert_eq!(s.selected_upgrade, 2);
    let s = handle_input(&s, &key(Key::Char('0')));
    assert_eq!(s.selected_upgrade, 2);
    let s = handle_input(&s, &key(Key::Char('9')));
    assert_eq!(s.selected_upgrade, 2);

    let s = handle_input(&s, &key(Key::Enter));
    assert_eq!(s.status, GameStatus::Playing);
    assert_relative_eq!(s.tower.range, 175.0);
}

#[test]
fn mouse_hover_click_and_double_click() {
    let s = menu_state();
    let rects = card_rects(&s.arena, s.upgrades.len());

    let s = handle_input(&s, &InputEvent::MouseMotion { at: rects[3].center() });
    assert_eq!(s.selected_upgrade, 3);

    let s = handle_input(&s, &InputEvent::MouseDown { at: rects[1].center(), clicks: 1 });
    assert_eq!(s.selected_upgrade, 1);
    assert_eq!(s.status, GameStatus::UpgradeMenu);

    let s = handle_input(&s, &InputEvent::MouseDown { at: rects[4].center(), clicks: 2 });
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.upgrades.len(), 0);
    assert_eq!(s.tower.ricochet_count, 1);
}

#[test]
fn mouse_outside_cards_is_ignored() {
    let s = menu_state();
    let corner = Vec2::new(s.arena.left + 1.0, s.arena.bottom + 1.0);
    assert_eq!(handle_input(&s, &InputEvent::MouseMotion { at: corner }), s);
    assert_eq!(handle_input(&s, &InputEvent::MouseDown { at: corner, clicks: 2 }), s);
}

#[test]
fn offered_cards_follow_the_kind_order() {
    let s = menu_state();
    assert_eq!(s.upgrades[1].kind, UpgradeKind::AttackSpeed);
}

// ── Game over / restart ───────────────────────────────────────────────────────

#[test]
fn restart_keeps_best_wave_only() {
    let mut s = quiet_state();
    s.status = GameStatus::GameOver;
    s.wave.wave = 3;
    s.high_score = 3;
    s.total_kills = 40;
    s.tower.health = 0;

    assert_eq!(handle_input(&s, &key(Key::Char('x'))), s);

    let r = handle_input(&s, &key(Key::Char('r')));
    assert_eq!(r.status, GameStatus::Playing);
    assert_eq!(r.wave.wave, 1);
    assert_eq!(r.high_score, 3);
    assert_eq!(r.total_kills, 0);
    assert_eq!(r.tower.health, r.tower.max_health);
    assert_eq!(handle_input(&s, &key(Key::Space)), r);
}

#[test]
fn input_is_ignored_while_playing() {
    let s = quiet_state();
    assert_eq!(handle_input(&s, &key(Key::Enter)), s);
    assert_eq!(handle_input(&s, &key(Key::Char('r'))), s);
}

// ── Long run ──────────────────────────────────────────────────────────────────

#[test]
fn long_match_keeps_invariants() {
    let mut rng = seeded_rng();
    let mut s = init_state(GameConfig::default(), 0);
    let mut last_kills = 0;
    for _ in 0..4000 {
        s = match s.status {
            GameStatus::Playing => tick(&s, 0.05, &mut rng),
            GameStatus::UpgradeMenu => confirm_upgrade(&s),
            GameStatus::GameOver => break,
        };
        assert!(s.tower.health >= 0 && s.tower.health <= s.tower.max_health);
        assert!(s.combatants.len() <= s.config.waves.max_concurrent);
        assert!(s.wave.spawned <= s.wave.required);
        assert!(s.wave.killed <= s.wave.spawned);
        assert!(s.total_kills >= last_kills);
        for c in &s.combatants {
            assert!(c.is_alive());
            assert!(c.health > 0 && c.health <= c.max_health);
        }
        last_kills = s.total_kills;
    }
    assert!(s.total_kills > 0);
}
