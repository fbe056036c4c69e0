/// Match controller.
///
/// Every public function takes an immutable reference to the current
/// `MatchState` (and, where needed, an RNG handle) and returns a brand-new
/// `MatchState`.  Side effects are limited to the injected RNG and logging.

use rand::Rng;

use crate::combatant::{Combatant, CombatantId};
use crate::config::GameConfig;
use crate::director::{Difficulty, WaveState};
use crate::entities::{GameStatus, InputEvent, Key, MatchState};
use crate::geometry::{Rect, Vec2};
use crate::projectile::{FlightLimits, Projectile};
use crate::tower::Tower;
use crate::upgrade::{self, card_at};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Wave 1, full-health tower in the middle of the arena.
pub fn init_state(config: GameConfig, high_score: u32) -> MatchState {
    let arena = Rect::new(0.0, 0.0, config.arena.width, config.arena.height);
    let limits = FlightLimits::for_arena(
        &arena,
        config.arena.projectile_padding,
        config.arena.projectile_lifetime,
    );
    MatchState {
        arena,
        limits,
        tower: Tower::new(arena.center(), &config.tower, limits),
        combatants: Vec::new(),
        stray_projectiles: Vec::new(),
        wave: WaveState::new(&config.waves),
        difficulty: Difficulty::default(),
        status: GameStatus::Playing,
        upgrades: Vec::new(),
        selected_upgrade: 0,
        total_kills: 0,
        high_score,
        config,
    }
}

/// Fresh match with the same config; the best wave carries over.
pub fn restart(state: &MatchState) -> MatchState {
    log::info!("restarting (best wave so far: {})", state.high_score);
    init_state(state.config.clone(), state.high_score)
}

// ── Upgrade menu transitions (pure) ─────────────────────────────────────────

pub fn select_upgrade(state: &MatchState, index: usize) -> MatchState {
    if state.status != GameStatus::UpgradeMenu || index >= state.upgrades.len() {
        return state.clone();
    }
    MatchState {
        selected_upgrade: index,
        ..state.clone()
    }
}

pub fn select_next_upgrade(state: &MatchState) -> MatchState {
    let n = state.upgrades.len().max(1);
    select_upgrade(state, (state.selected_upgrade + 1) % n)
}

pub fn select_previous_upgrade(state: &MatchState) -> MatchState {
    let n = state.upgrades.len().max(1);
    select_upgrade(state, (state.selected_upgrade + n - 1) % n)
}

/// Apply the highlighted card and start the next wave.
pub fn confirm_upgrade(state: &MatchState) -> MatchState {
    if state.status != GameStatus::UpgradeMenu {
        return state.clone();
    }
    let mut next = state.clone();
    if let Some(card) = next.upgrades.get(next.selected_upgrade).cloned() {
        card.apply(&mut next.tower);
        log::info!("upgrade applied: {} ({})", card.name, card.description);
    }
    next.wave.advance(&next.config.waves, &mut next.difficulty);
    next.upgrades.clear();
    next.selected_upgrade = 0;
    next.status = GameStatus::Playing;
    next
}

/// Route one platform event according to the current status.
pub fn handle_input(state: &MatchState, event: &InputEvent) -> MatchState {
    match state.status {
        GameStatus::UpgradeMenu => match *event {
            InputEvent::KeyDown(Key::Up | Key::Left) => select_previous_upgrade(state),
            InputEvent::KeyDown(Key::Down | Key::Right) => select_next_upgrade(state),
            InputEvent::KeyDown(Key::Enter | Key::Space) => confirm_upgrade(state),
            InputEvent::KeyDown(Key::Char(c)) => match c.to_digit(10) {
                Some(d) if d >= 1 => select_upgrade(state, d as usize - 1),
                _ => state.clone(),
            },
            InputEvent::MouseMotion { at } => match card_at(&state.arena, state.upgrades.len(), at) {
                Some(i) => select_upgrade(state, i),
                None => state.clone(),
            },
            InputEvent::MouseDown { at, clicks } => match card_at(&state.arena, state.upgrades.len(), at) {
                Some(i) if clicks >= 2 => confirm_upgrade(&select_upgrade(state, i)),
                Some(i) => select_upgrade(state, i),
                None => state.clone(),
            },
            _ => state.clone(),
        },
        GameStatus::GameOver => match *event {
            InputEvent::KeyDown(Key::Space | Key::Enter | Key::Char('r') | Key::Char('R')) => restart(state),
            _ => state.clone(),
        },
        GameStatus::Playing => state.clone(),
    }
}

// ── Per-frame tick (nearly pure: the RNG is injected) ───────────────────────

/// Advance the simulation by `dt` seconds.  Only `Playing` advances; the
/// menus are frozen.  All randomness comes through `rng`.
pub fn tick<R: Rng + ?Sized>(state: &MatchState, dt: f32, rng: &mut R) -> MatchState {
    let mut next = state.clone();
    if next.status == GameStatus::Playing {
        step(&mut next, dt.max(0.0), rng);
    }
    next
}

fn step<R: Rng + ?Sized>(state: &mut MatchState, dt: f32, rng: &mut R) {
    // ── 1. Tower cools down and flies its shots; orphaned shots fly on ──────
    state.tower.advance(dt);
    for p in &mut state.stray_projectiles {
        p.advance(dt);
    }

    // ── 2. Spawn ────────────────────────────────────────────────────────────
    let living = state.living_count();
    if let Some(spawned) = state.wave.update(
        dt,
        living,
        rng,
        &state.arena,
        &state.config,
        &state.difficulty,
        state.limits,
    ) {
        state.combatants.push(spawned);
    }

    // ── 3. Combatants move, attack, and take the tower's fire ───────────────
    let target = state.tower.center();
    let reach = state.tower.range * state.config.tower.ricochet_range_factor;
    let falloff = state.config.tower.ricochet_falloff;
    let mut spent = vec![false; state.tower.projectiles.len()];
    let mut chained: Vec<Projectile> = Vec::new();

    let mut i = 0;
    while i < state.combatants.len() {
        let combatant = &mut state.combatants[i];
        combatant.tick(target, dt);
        if let Some(damage) = combatant.attack(target, dt, rng) {
            state.tower.take_damage(damage);
        }

        resolve_tower_hits(
            &mut state.tower.projectiles,
            &mut spent,
            &mut state.combatants,
            i,
            reach,
            falloff,
            &mut chained,
        );

        if state.combatants[i].is_alive() {
            i += 1;
            continue;
        }
        let mut dead = state.combatants.swap_remove(i);
        state.stray_projectiles.extend(dead.take_projectiles());
        state.wave.record_kill();
        state.total_kills += 1;
        log::debug!(
            "{} {:?} destroyed ({}/{} this wave)",
            dead.kind.name(),
            dead.id,
            state.wave.killed,
            state.wave.required
        );
    }
    state.tower.projectiles.extend(chained);

    // Targets are picked from this frame's positions, not last frame's.
    state.tower.fire(&state.combatants);

    // ── 4. Hostile shots vs the tower ───────────────────────────────────────
    let hitbox = state.tower.hitbox();
    let hostile = state
        .combatants
        .iter_mut()
        .flat_map(|c| c.projectiles.iter_mut())
        .chain(state.stray_projectiles.iter_mut());
    for p in hostile {
        if p.check_hit(&hitbox) {
            state.tower.take_damage(p.damage);
            p.register_hit(None);
        }
    }

    // ── 5. Purge spent projectiles everywhere ───────────────────────────────
    state.tower.projectiles.retain(Projectile::is_active);
    for c in &mut state.combatants {
        c.projectiles.retain(Projectile::is_active);
    }
    state.stray_projectiles.retain(Projectile::is_active);

    // ── 6. Status transitions ───────────────────────────────────────────────
    if state.tower.is_destroyed() {
        state.status = GameStatus::GameOver;
        state.high_score = state.high_score.max(state.wave.wave);
        log::info!(
            "tower destroyed on wave {} after {} kills",
            state.wave.wave,
            state.total_kills
        );
    } else if state.wave.is_complete(state.living_count()) {
        state.tower.heal(state.config.waves.wave_clear_heal);
        state.high_score = state.high_score.max(state.wave.wave);
        state.upgrades = upgrade::offer(&state.config.upgrades);
        state.selected_upgrade = 0;
        state.status = GameStatus::UpgradeMenu;
        log::info!(
            "wave {} cleared, tower at {}/{}",
            state.wave.wave,
            state.tower.health,
            state.tower.max_health
        );
    }
}

// ── Collision resolution ─────────────────────────────────────────────────────

/// Nearest living combatant to `from` other than `exclude`, no farther than
/// `max_range`.  The first one found wins ties.
pub fn find_ricochet_target(
    combatants: &[Combatant],
    from: Vec2,
    exclude: CombatantId,
    max_range: f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in combatants.iter().enumerate() {
        if c.id == exclude || !c.is_alive() {
            continue;
        }
        let d = c.distance_to(from);
        if d <= max_range && best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Tower shots against `combatants[index]`.
///
/// A shot damages at most one combatant per tick (`spent`), and shots stop
/// landing once the victim is dead so the rest keep flying.
fn resolve_tower_hits(
    projectiles: &mut [Projectile],
    spent: &mut [bool],
    combatants: &mut [Combatant],
    index: usize,
    reach: f32,
    falloff: f32,
    chained: &mut Vec<Projectile>,
) {
    for (p, spent) in projectiles.iter_mut().zip(spent.iter_mut()) {
        let victim = &combatants[index];
        if !victim.is_alive() {
            break;
        }
        if *spent || !p.check_hit_on(victim.id, &victim.shape) {
            continue;
        }
        let id = victim.id;

        if let Some(next) = find_ricochet_target(combatants, p.position, id, reach) {
            if let Some(child) = p.spawn_ricochet(id, combatants[next].center(), falloff) {
                chained.push(child);
            }
        }
        combatants[index].take_damage(p.damage);
        p.register_hit(Some(id));
        *spent = true;
    }
}
